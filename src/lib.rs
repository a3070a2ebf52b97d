//! Client for the Absaar/mini-EMS solar inverter cloud API.
//!
//! Logs in with account credentials, discovers the station → collector →
//! inverter tree and exposes telemetry as unit-tagged [`reading::Reading`]
//! values that are re-polled on a fixed interval. All calls are sequential
//! request/response; there is no retry and the session token is obtained
//! once and never refreshed.

pub mod api;
pub mod model;
pub mod profile;
pub mod reading;

pub use api::Error;
