use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(deserialize_with = "super::string_or_number")]
    pub inverter_id: String,
    pub collector_name: String,
}

#[derive(Deserialize)]
pub struct ListCollectors {
    pub rows: Vec<Row>,
}
