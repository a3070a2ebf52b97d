use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(deserialize_with = "super::string_or_number")]
    pub power_id: String,
    pub power_name: String,
    #[serde(default)]
    pub daily_power_generation: f64,
    #[serde(default)]
    pub total_power_generation: f64,
}

#[derive(Deserialize)]
pub struct ListStations {
    pub rows: Vec<Row>,
}
