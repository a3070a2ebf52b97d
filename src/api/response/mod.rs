pub mod inverter_data;
pub mod list_collectors;
pub mod list_stations;
pub mod user_login;

use serde::Deserialize;
use serde_json::Value;

/* Identifiers (userId, powerId, inverterId) arrive as strings or bare
 * numbers depending on the account; normalize to String. */
pub(crate) fn string_or_number<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/* Error body returned by the login endpoint on bad credentials */
#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod test {
    use super::inverter_data::InverterDataList;
    use super::list_collectors::ListCollectors;
    use super::list_stations::ListStations;
    use super::user_login::UserLogin;
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn user_login() {
        let input = read_resource("userLogin.json");
        let output: UserLogin = serde_json::from_str(&input).unwrap();
        assert_eq!("abc", output.token);
        assert_eq!("42", output.user_id);
    }

    #[test]
    fn user_login_numeric_user_id() {
        let input = read_resource("userLogin_numericId.json");
        let output: UserLogin = serde_json::from_str(&input).unwrap();
        assert_eq!("4711", output.user_id);
    }

    #[test]
    #[should_panic]
    fn user_login_missing_token() {
        let input = read_resource("userLogin_failed.json");
        let _output: UserLogin = serde_json::from_str(&input).unwrap();
    }

    #[test]
    fn login_error_body() {
        let input = read_resource("userLogin_failed.json");
        let output: super::ErrorResponse = serde_json::from_str(&input).unwrap();
        assert_eq!(Some("bad creds".to_string()), output.error);
        assert_eq!(None, output.message);
    }

    #[test]
    fn station_list() {
        let input = read_resource("stationList.json");
        let output: ListStations = serde_json::from_str(&input).unwrap();
        assert_eq!("P1", output.rows[0].power_id);
        assert_eq!("Home", output.rows[0].power_name);
        assert_eq!(5.2, output.rows[0].daily_power_generation);
        assert_eq!(120.0, output.rows[0].total_power_generation);
    }

    #[test]
    fn collector_list() {
        let input = read_resource("collectorList.json");
        let output: ListCollectors = serde_json::from_str(&input).unwrap();
        assert_eq!("INV1", output.rows[0].inverter_id);
        assert_eq!("Collector 1", output.rows[0].collector_name);
    }

    #[test]
    fn inverter_data_list() {
        let input = read_resource("inverterDataList.json");
        let output: InverterDataList = serde_json::from_str(&input).unwrap();
        assert_eq!(1, output.rows.len());
        assert_eq!(450.0, output.rows[0]["acPower"].as_f64().unwrap());
    }

    #[test]
    fn inverter_data_list_empty() {
        let input = read_resource("inverterDataList_empty.json");
        let output: InverterDataList = serde_json::from_str(&input).unwrap();
        assert!(output.rows.is_empty());
    }

    #[test]
    #[should_panic]
    fn inverter_data_list_missing_rows() {
        let input = read_resource("missing_rows.json");
        let _output: InverterDataList = serde_json::from_str(&input).unwrap();
    }

    #[test]
    #[should_panic]
    fn inverter_data_list_invalid_json() {
        let input = read_resource("invalid_json.json");
        let _output: InverterDataList = serde_json::from_str(&input).unwrap();
    }
}
