use absaar_ems_rs::model::LoggedInApi;
use absaar_ems_rs::reading::{Reading, ReadingKind, StationMetric};
use prometheus::{Encoder, GaugeVec, TextEncoder};

lazy_static! {
    static ref READING_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("reading_value", "current value of an inverter metric reading",),
        &["power_id", "inverter_id", "metric"],
    )
    .unwrap();
    static ref STATION_DAILY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "station_daily_power_kwh",
            "power generated by station in current day (in kWh)",
        ),
        &["power_id"],
    )
    .unwrap();
    static ref STATION_TOTAL_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "station_total_power_kwh",
            "total power generated by station (in kWh)",
        ),
        &["power_id"],
    )
    .unwrap();
}

/// Feed one Reading into the exporter registry. Readings currently in the
/// "No Data" state are skipped; their gauge keeps the last good value.
fn export_reading(reading: &Reading) {
    let value = match reading.value() {
        Some(value) => value,
        None => return,
    };

    match reading.kind() {
        ReadingKind::Inverter => READING_GAUGE
            .with_label_values(&[
                &reading.power_id,
                reading.inverter_id.as_deref().unwrap_or_default(),
                reading.metric_key,
            ])
            .set(value),
        ReadingKind::Station(StationMetric::DailyPowerGeneration) => STATION_DAILY_GAUGE
            .with_label_values(&[&reading.power_id])
            .set(value),
        ReadingKind::Station(StationMetric::TotalPowerGeneration) => STATION_TOTAL_GAUGE
            .with_label_values(&[&reading.power_id])
            .set(value),
    }
}

/// Update every Reading sequentially and push the results into the
/// Prometheus registry. Individual failures surface as "No Data" readings,
/// never as an error from here.
pub async fn collect(api: &LoggedInApi, readings: &mut [Reading]) {
    for reading in readings.iter_mut() {
        reading.update(api).await;
        export_reading(reading);
    }
}

/// Read metrics from Prometheus exporter registry.
pub async fn read() -> Result<String, absaar_ems_rs::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).or(Err(absaar_ems_rs::Error::FormatError))
}
