use serde_json::Value;

type KWh = f64;

#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub username: String,
    pub password: String,
    /// The vendor endpoint serves a certificate that fails normal
    /// verification; this stays configurable instead of hardcoded.
    pub accept_invalid_certs: bool,
}

#[derive(Debug)]
pub struct LoggedInApi {
    pub api_url: String,
    pub token: String,
    pub user_id: String,
    pub client: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct Station {
    pub power_id: String,
    pub name: String,
    pub daily_power_generation: KWh,
    pub total_power_generation: KWh,
}

#[derive(Debug, Clone)]
pub struct Collector {
    pub inverter_id: String,
    pub name: String,
}

/// One row of current inverter state, kept as the raw vendor field map so
/// metric profiles can pick any subset of keys out of it.
#[derive(Debug, Clone)]
pub struct InverterSnapshot {
    pub fields: serde_json::Map<String, Value>,
}

impl InverterSnapshot {
    /// Numeric value of a metric field. The vendor is inconsistent about
    /// returning numbers vs. numeric strings, so both are accepted.
    pub fn metric(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn equipment_model(&self) -> Option<&str> {
        self.fields.get("equipmentModel").and_then(Value::as_str)
    }

    pub fn run_status(&self) -> Option<&str> {
        self.fields.get("runStatus").and_then(Value::as_str)
    }
}
