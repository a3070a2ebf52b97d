pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
pub use error::Error;
use response::inverter_data::InverterDataList;
use response::list_collectors::ListCollectors;
use response::list_stations::ListStations;
use response::user_login::UserLogin;
use serde_json::Value;

use std::collections::HashMap;

const AUTHORIZATION: &str = "Authorization";
/* The vendor backend rejects unknown user agents, so we present the one the
 * official mobile app uses. */
const USER_AGENT: &str = "okhttp-okgo/jeasonlzy";

pub fn api(
    api_url: String,
    username: String,
    password: String,
    accept_invalid_certs: bool,
) -> model::Api {
    model::Api {
        api_url,
        username,
        password,
        accept_invalid_certs,
    }
}

/// Map Non-200 API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::UNAUTHORIZED) => Error::LoginError(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

/// Obtain a session token. The endpoint answers HTTP 200 with a `token` and
/// `userId` on success; anything else (transport error, non-200, missing
/// field) is a `LoginError`. The token is never refreshed afterwards.
pub async fn login(api: &model::Api) -> Result<model::LoggedInApi, Error> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(api.accept_invalid_certs)
        .build()
        .or(Err(Error::InternalError))?;
    let url = format!("{}{}", api.api_url, endpoint::LOGIN);

    let request_body = HashMap::from([
        ("username", api.username.to_owned()),
        ("password", api.password.to_owned()),
    ]);

    let response = client
        .post(url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| Error::LoginError(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::LoginError(e.to_string()))?;

    if !status.is_success() {
        return Err(Error::LoginError(format!(
            "server responded {}: {}",
            status, body
        )));
    }

    serde_json::from_str::<UserLogin>(&body)
        .or(Err(Error::LoginError(format!(
            "no token received: {}",
            body
        ))))
        .map(|login| model::LoggedInApi {
            api_url: api.api_url.to_owned(),
            token: login.token,
            user_id: login.user_id,
            client,
        })
}

async fn execute(request: reqwest::RequestBuilder) -> Result<Value, Error> {
    request
        .send()
        .await
        .map_err(map_api_err)?
        .error_for_status()
        .map_err(map_api_err)?
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))
        .map(|s| {
            serde_json::from_str::<Value>(&s).map_err(|e| Error::InvalidResponse(s, e.to_string()))
        })?
}

async fn post(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    data: &HashMap<&str, String>,
) -> Result<Value, Error> {
    let url = format!("{}{}", api.api_url, endpoint);
    log::trace!("endpoint: {}, data: {:#?}", endpoint, data);

    execute(
        api.client
            .post(url)
            .json(data)
            .header(AUTHORIZATION, api.token.to_owned()),
    )
    .await
}

/* The station list endpoint is the one call the backend expects
 * form-encoded rather than as a JSON body. */
async fn post_form(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    data: &HashMap<&str, String>,
) -> Result<Value, Error> {
    let url = format!("{}{}", api.api_url, endpoint);
    log::trace!("endpoint: {}, data: {:#?}", endpoint, data);

    execute(
        api.client
            .post(url)
            .form(data)
            .header(AUTHORIZATION, api.token.to_owned()),
    )
    .await
}

/// List all stations of the logged-in account.
pub async fn stations(api: &model::LoggedInApi) -> Result<Vec<model::Station>, Error> {
    let request_body = HashMap::from([("userId", api.user_id.to_owned())]);

    post_form(api, endpoint::STATIONS, &request_body)
        .await
        .map(serde_json::from_value::<ListStations>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            let stations = response
                .rows
                .into_iter()
                .map(|row| model::Station {
                    power_id: row.power_id,
                    name: row.power_name,
                    daily_power_generation: row.daily_power_generation,
                    total_power_generation: row.total_power_generation,
                })
                .collect();
            Ok(stations)
        })?
}

/// List all collectors installed in `station`.
pub async fn collectors(
    api: &model::LoggedInApi,
    station: &model::Station,
) -> Result<Vec<model::Collector>, Error> {
    let request_body = HashMap::from([("powerId", station.power_id.to_owned())]);

    post(api, endpoint::COLLECTORS, &request_body)
        .await
        .map(serde_json::from_value::<ListCollectors>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            let collectors = response
                .rows
                .into_iter()
                .map(|row| model::Collector {
                    inverter_id: row.inverter_id,
                    name: row.collector_name,
                })
                .collect();
            Ok(collectors)
        })?
}

/// Current state of one inverter. The API returns a single row representing
/// the latest known values, not a time series; an empty `rows` means the
/// inverter has not reported recently.
pub async fn inverter_data(
    api: &model::LoggedInApi,
    power_id: &str,
    inverter_id: &str,
) -> Result<Vec<model::InverterSnapshot>, Error> {
    let request_body = HashMap::from([
        ("powerId", power_id.to_owned()),
        ("inverterId", inverter_id.to_owned()),
    ]);

    post(api, endpoint::INVERTER_DATA, &request_body)
        .await
        .map(serde_json::from_value::<InverterDataList>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            let snapshots = response
                .rows
                .into_iter()
                .map(|fields| model::InverterSnapshot { fields })
                .collect();
            Ok(snapshots)
        })?
}
