#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use absaar_ems_rs::api;
use absaar_ems_rs::model::{Api, LoggedInApi};
use absaar_ems_rs::profile::MetricProfile;
use absaar_ems_rs::reading::{self, Reading};
use config::Config;
use rocket::{Build, Rocket, State};
use std::sync::Mutex;
use std::time::Instant;

mod metrics;

const API_URL: &str = "https://mini-ems.com:8081";
/* Poll cadence of the upstream mobile app */
const DEFAULT_INTERVAL_SECS: i64 = 120;

#[derive(Clone, serde::Deserialize)]
pub struct EmsConfig {
    api_url: String,
    username: String,
    password: String,
    interval: u64,
    profile: String,
    accept_invalid_certs: bool,
}

/// Session established once at startup: the logged-in API handle plus the
/// Readings discovered under it. The token inside is never refreshed; if it
/// expires the affected readings go to "No Data" until restart.
pub struct Session {
    api: LoggedInApi,
    readings: Vec<Reading>,
}

/// Structure containing state for API handlers.
pub struct StateData {
    api: Api,
    profile: &'static MetricProfile,
    interval: u64,
    session: rocket::tokio::sync::Mutex<Option<Session>>,
    /// Timestamp of last successful metric collection via `metrics::collect()`
    timestamp: Mutex<Option<Instant>>,
}

impl StateData {
    /// Updates `timestamp` to `now()`.
    fn touch(&self) {
        if let Ok(mut ts) = self.timestamp.lock() {
            *ts = Some(Instant::now());
        } else {
            log::trace!("Unable to lock timestamp mutex, will refresh again")
        }
    }

    /// Checks whether `interval_secs` elapsed since last `touch()`
    fn interval_elapsed(&self, interval_secs: u64) -> bool {
        let elapsed_opt = self
            .timestamp
            .lock()
            .ok()
            .and_then(|a| a.map(|b| b.elapsed().as_secs()));

        if let Some(elapsed) = elapsed_opt {
            elapsed > interval_secs
        } else {
            /* If there is None timestamp/elapsed, always return true to trigger action */
            true
        }
    }
}

pub fn read_settings() -> EmsConfig {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("EMS"))
        .unwrap()
        .set_default("api_url", API_URL)
        .unwrap()
        .set_default("interval", DEFAULT_INTERVAL_SECS)
        .unwrap()
        .set_default("profile", "standard")
        .unwrap()
        /* The vendor endpoint has historically served a broken certificate
         * chain; verification stays off unless explicitly enabled. */
        .set_default("accept_invalid_certs", true)
        .unwrap();

    settings.try_into().expect("Configuration error")
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, api::Error> {
    if state.interval_elapsed(state.interval) {
        let mut session = state.session.lock().await;

        if session.is_none() {
            let logged_in = match api::login(&state.api).await {
                Ok(logged_in) => logged_in,
                Err(e) => {
                    log::error!("Authentication failed: {:?}", e);
                    return Err(e);
                }
            };
            let readings = reading::discover(&logged_in, state.profile).await?;
            log::info!("Discovered {} readings", readings.len());
            *session = Some(Session {
                api: logged_in,
                readings,
            });
        }

        if let Some(session) = session.as_mut() {
            metrics::collect(&session.api, &mut session.readings).await;
        }
        state.touch();
    } else {
        log::info!("interval time not yet elapsed since last run; returning cached result")
    }
    metrics::read().await
}

#[get("/readings")]
async fn readings_route(state: &State<StateData>) -> Result<String, api::Error> {
    let session = state.session.lock().await;

    match session.as_ref() {
        Some(session) => {
            let exports: Vec<_> = session.readings.iter().map(Reading::export).collect();
            serde_json::to_string_pretty(&exports).or(Err(api::Error::FormatError))
        }
        None => Ok("[]".to_string()),
    }
}

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings = read_settings();
    let profile =
        MetricProfile::by_name(&settings.profile).expect("Configuration error: unknown profile");
    let api = api::api(
        settings.api_url,
        settings.username,
        settings.password,
        settings.accept_invalid_certs,
    );
    let state = StateData {
        api,
        profile,
        interval: settings.interval,
        session: rocket::tokio::sync::Mutex::new(None),
        timestamp: Mutex::new(None),
    };

    rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, readings_route])
}
