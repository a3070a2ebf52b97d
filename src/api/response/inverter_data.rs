use serde::Deserialize;
use serde_json::Value;

/* Rows are kept as raw field maps; which keys matter is decided by the
 * active metric profile, not the wire layer. */
#[derive(Deserialize)]
pub struct InverterDataList {
    pub rows: Vec<serde_json::Map<String, Value>>,
}
