use crate::api;
use crate::model::{InverterSnapshot, LoggedInApi, Station};
use crate::profile::MetricProfile;
use serde::Serialize;
use serde_json::Value;

use std::collections::HashMap;

/// Literal state exposed to the host when a poll returns no rows.
pub const NO_DATA: &str = "No Data";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingState {
    Uninitialized,
    Value(f64),
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationMetric {
    DailyPowerGeneration,
    TotalPowerGeneration,
}

impl StationMetric {
    fn key(&self) -> &'static str {
        match self {
            StationMetric::DailyPowerGeneration => "dailyPowerGeneration",
            StationMetric::TotalPowerGeneration => "totalPowerGeneration",
        }
    }

    fn of(&self, station: &Station) -> f64 {
        match self {
            StationMetric::DailyPowerGeneration => station.daily_power_generation,
            StationMetric::TotalPowerGeneration => station.total_power_generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Inverter,
    Station(StationMetric),
}

/// One named, unit-tagged value exposed to the host, backed by one metric
/// field of one inverter or station. Which metric a Reading reports is fixed
/// at construction; only its state and attributes change on poll ticks.
#[derive(Debug)]
pub struct Reading {
    pub name: String,
    pub power_id: String,
    pub inverter_id: Option<String>,
    pub metric_key: &'static str,
    pub unit: &'static str,
    kind: ReadingKind,
    state: ReadingState,
    attributes: HashMap<&'static str, String>,
}

/// Host-facing view of a Reading.
#[derive(Serialize)]
pub struct ReadingExport {
    pub name: String,
    pub state: Value,
    pub unit_of_measurement: String,
    pub attributes: HashMap<&'static str, String>,
}

impl Reading {
    pub fn new_inverter(
        station: &Station,
        inverter_id: &str,
        metric_key: &'static str,
        unit: &'static str,
    ) -> Reading {
        Reading {
            name: format!("{} {}", station.name, metric_key),
            power_id: station.power_id.to_owned(),
            inverter_id: Some(inverter_id.to_owned()),
            metric_key,
            unit,
            kind: ReadingKind::Inverter,
            state: ReadingState::Uninitialized,
            attributes: HashMap::new(),
        }
    }

    /// Station readings start out with the value already present in the
    /// discovery row, so they begin in `Value` rather than `Uninitialized`.
    pub fn new_station(station: &Station, metric: StationMetric) -> Reading {
        Reading {
            name: format!("{} {}", station.name, metric.key()),
            power_id: station.power_id.to_owned(),
            inverter_id: None,
            metric_key: metric.key(),
            unit: "kWh",
            kind: ReadingKind::Station(metric),
            state: ReadingState::Value(metric.of(station)),
            attributes: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ReadingKind {
        self.kind
    }

    pub fn state(&self) -> ReadingState {
        self.state
    }

    /// Numeric value, if the last poll produced one.
    pub fn value(&self) -> Option<f64> {
        match self.state {
            ReadingState::Value(v) => Some(v),
            _ => None,
        }
    }

    /// State as shown to the host: the value, or the literal "No Data".
    pub fn state_json(&self) -> Value {
        match self.state {
            ReadingState::Value(v) => Value::from(v),
            ReadingState::NoData => Value::from(NO_DATA),
            ReadingState::Uninitialized => Value::from("unknown"),
        }
    }

    pub fn export(&self) -> ReadingExport {
        ReadingExport {
            name: self.name.to_owned(),
            state: self.state_json(),
            unit_of_measurement: self.unit.to_owned(),
            attributes: self.attributes.clone(),
        }
    }

    /// Poll tick. Re-fetches this Reading's backing data and transitions to
    /// `Value` or `NoData`; fetch failures never propagate, they log and
    /// collapse to `NoData`.
    pub async fn update(&mut self, api: &LoggedInApi) {
        match self.kind {
            ReadingKind::Inverter => {
                let inverter_id = self.inverter_id.as_deref().unwrap_or_default().to_owned();
                match api::inverter_data(api, &self.power_id, &inverter_id).await {
                    Ok(rows) => self.apply_inverter_rows(&rows),
                    Err(e) => {
                        log::warn!("No inverter data received for ID {}: {:?}", inverter_id, e);
                        self.state = ReadingState::NoData;
                    }
                }
            }
            ReadingKind::Station(_) => match api::stations(api).await {
                Ok(rows) => self.apply_station_rows(&rows),
                Err(e) => {
                    log::warn!("No station data received for ID {}: {:?}", self.power_id, e);
                    self.state = ReadingState::NoData;
                }
            },
        }
    }

    fn apply_inverter_rows(&mut self, rows: &[InverterSnapshot]) {
        match rows.first() {
            None => {
                log::warn!(
                    "No inverter data received for ID {}",
                    self.inverter_id.as_deref().unwrap_or_default()
                );
                self.state = ReadingState::NoData;
            }
            Some(snapshot) => {
                self.state = ReadingState::Value(snapshot.metric(self.metric_key).unwrap_or(0.0));
                self.attributes = HashMap::from([
                    ("power_id", self.power_id.to_owned()),
                    (
                        "inverter_id",
                        self.inverter_id.as_deref().unwrap_or_default().to_owned(),
                    ),
                    (
                        "equipment_model",
                        snapshot.equipment_model().unwrap_or_default().to_owned(),
                    ),
                    (
                        "run_status",
                        snapshot.run_status().unwrap_or("unknown").to_owned(),
                    ),
                ]);
            }
        }
    }

    /* Each station reading filters the list by its own power_id instead of
     * taking the first row, so multi-station accounts report per-station
     * values. */
    fn apply_station_rows(&mut self, rows: &[Station]) {
        let metric = match self.kind {
            ReadingKind::Station(metric) => metric,
            ReadingKind::Inverter => return,
        };

        match rows.iter().find(|s| s.power_id == self.power_id) {
            None => {
                log::warn!("No station data received for ID {}", self.power_id);
                self.state = ReadingState::NoData;
            }
            Some(station) => {
                self.state = ReadingState::Value(metric.of(station));
            }
        }
    }
}

/// Walk the station → collector → inverter tree and build the full set of
/// Readings. A failed station list aborts the pass; anything below that is
/// skipped with a warning so the rest of the tree still builds.
pub async fn discover(
    api: &LoggedInApi,
    profile: &MetricProfile,
) -> Result<Vec<Reading>, api::Error> {
    let stations = api::stations(api).await?;
    let mut readings = Vec::new();

    for station in stations {
        readings.push(Reading::new_station(
            &station,
            StationMetric::DailyPowerGeneration,
        ));
        readings.push(Reading::new_station(
            &station,
            StationMetric::TotalPowerGeneration,
        ));

        let collectors = match api::collectors(api, &station).await {
            Ok(collectors) => collectors,
            Err(e) => {
                log::warn!("No collectors found for station {}: {:?}", station.name, e);
                continue;
            }
        };
        if collectors.is_empty() {
            log::warn!("No collectors found for station {}", station.name);
            continue;
        }

        for collector in collectors {
            match api::inverter_data(api, &station.power_id, &collector.inverter_id).await {
                Ok(rows) if !rows.is_empty() => {
                    for &(key, unit) in profile.fields {
                        readings.push(Reading::new_inverter(
                            &station,
                            &collector.inverter_id,
                            key,
                            unit,
                        ));
                    }
                }
                Ok(_) => log::warn!("No inverter data found for {}", collector.name),
                Err(e) => log::warn!("No inverter data found for {}: {:?}", collector.name, e),
            }
        }
    }

    Ok(readings)
}

#[cfg(test)]
mod test {
    use super::{Reading, ReadingState, StationMetric, NO_DATA};
    use crate::model::{InverterSnapshot, Station};
    use serde_json::json;

    fn station() -> Station {
        Station {
            power_id: "P1".to_string(),
            name: "Home".to_string(),
            daily_power_generation: 5.2,
            total_power_generation: 120.0,
        }
    }

    fn snapshot(value: serde_json::Value) -> InverterSnapshot {
        match value {
            serde_json::Value::Object(fields) => InverterSnapshot { fields },
            _ => panic!("test snapshot must be an object"),
        }
    }

    #[test]
    fn inverter_reading_starts_uninitialized() {
        let reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        assert_eq!(ReadingState::Uninitialized, reading.state());
        assert_eq!("Home acPower", reading.name);
    }

    #[test]
    fn station_reading_carries_discovery_value() {
        let daily = Reading::new_station(&station(), StationMetric::DailyPowerGeneration);
        let total = Reading::new_station(&station(), StationMetric::TotalPowerGeneration);
        assert_eq!(Some(5.2), daily.value());
        assert_eq!(Some(120.0), total.value());
        assert_eq!("kWh", daily.unit);
    }

    #[test]
    fn present_metric_is_applied() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        reading.apply_inverter_rows(&[snapshot(json!({"acPower": 450, "acVoltage": 230}))]);
        assert_eq!(Some(450.0), reading.value());
    }

    #[test]
    fn absent_metric_defaults_to_zero() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "temperature", "°C");
        reading.apply_inverter_rows(&[snapshot(json!({"acPower": 450, "acVoltage": 230}))]);
        assert_eq!(Some(0.0), reading.value());
    }

    #[test]
    fn empty_rows_transition_to_no_data() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        reading.apply_inverter_rows(&[snapshot(json!({"acPower": 450}))]);
        reading.apply_inverter_rows(&[]);
        assert_eq!(ReadingState::NoData, reading.state());
        assert_eq!(json!(NO_DATA), reading.state_json());
    }

    #[test]
    fn update_is_idempotent_for_unchanged_snapshot() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        let rows = [snapshot(json!({"acPower": 450.5, "runStatus": "normal"}))];
        reading.apply_inverter_rows(&rows);
        let first = reading.state();
        reading.apply_inverter_rows(&rows);
        assert_eq!(first, reading.state());
    }

    #[test]
    fn attributes_follow_snapshot() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        reading.apply_inverter_rows(&[snapshot(
            json!({"acPower": 450, "equipmentModel": "ABS-3600", "runStatus": "normal"}),
        )]);
        let export = reading.export();
        assert_eq!("P1", export.attributes["power_id"]);
        assert_eq!("INV1", export.attributes["inverter_id"]);
        assert_eq!("ABS-3600", export.attributes["equipment_model"]);
        assert_eq!("normal", export.attributes["run_status"]);
    }

    #[test]
    fn attributes_default_when_snapshot_omits_them() {
        let mut reading = Reading::new_inverter(&station(), "INV1", "acPower", "W");
        reading.apply_inverter_rows(&[snapshot(json!({"acPower": 450}))]);
        let export = reading.export();
        assert_eq!("", export.attributes["equipment_model"]);
        assert_eq!("unknown", export.attributes["run_status"]);
    }

    #[test]
    fn station_reading_filters_by_power_id() {
        let other = Station {
            power_id: "P0".to_string(),
            name: "First".to_string(),
            daily_power_generation: 99.0,
            total_power_generation: 999.0,
        };
        let mut daily = Reading::new_station(&station(), StationMetric::DailyPowerGeneration);
        let mut total = Reading::new_station(&station(), StationMetric::TotalPowerGeneration);

        /* Own station is not the first row; its values must still win. */
        daily.apply_station_rows(&[other.clone(), station()]);
        total.apply_station_rows(&[other, station()]);
        assert_eq!(Some(5.2), daily.value());
        assert_eq!(Some(120.0), total.value());
    }

    #[test]
    fn station_reading_missing_from_list_is_no_data() {
        let mut daily = Reading::new_station(&station(), StationMetric::DailyPowerGeneration);
        daily.apply_station_rows(&[]);
        assert_eq!(ReadingState::NoData, daily.state());
    }
}
