//! Console rendering of readings: a fixed-width text table or JSON lines.

use std::time::{SystemTime, UNIX_EPOCH};

use scale_hardware::PortDescriptor;
use scale_traits::{ConnectionError, TimestampedReading, Unit, epoch_secs};
use serde_json::json;

/// `HH:MM:SS.mmm` in UTC.
pub fn clock_time(t: SystemTime) -> String {
    let d = t.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = d.as_secs() % 86_400;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        secs / 60 % 60,
        secs % 60,
        d.subsec_millis()
    )
}

/// Weight column: `4.72 kg`, `2.40 lb (1.09 kg)` or `(unparsed)`.
/// `display_kg` replaces the measured kg value (e.g. when debounced).
pub fn weight_text(r: &TimestampedReading, display_kg: Option<f64>) -> String {
    match &r.reading.measurement {
        Some(m) => {
            let kg = display_kg.unwrap_or(m.value_kg);
            match m.unit {
                Unit::Kg => format!("{kg:.2} kg"),
                Unit::Lb => format!("{:.2} lb ({kg:.2} kg)", m.value_raw),
            }
        }
        None => "(unparsed)".to_string(),
    }
}

pub fn row(r: &TimestampedReading, display_kg: Option<f64>) -> String {
    format!(
        "{}  {:<24}  {}",
        clock_time(r.wall),
        r.reading.raw_text,
        weight_text(r, display_kg)
    )
}

pub fn json_row(r: &TimestampedReading, display_kg: Option<f64>) -> String {
    let m = r.reading.measurement.as_ref();
    json!({
        "timestamp": r.epoch_secs(),
        "raw": r.reading.raw_text,
        "parsed": m.is_some(),
        "valueRaw": m.map(|m| m.value_raw),
        "unit": m.map(|m| m.unit.as_str()),
        "valueKg": m.map(|m| m.value_kg),
        "weight": display_kg,
    })
    .to_string()
}

/// JSON line for a link failure seen mid-stream. Carries `reason` so
/// readers can tell it apart from reading rows.
pub fn status_json(err: &ConnectionError, wall: SystemTime) -> String {
    json!({
        "timestamp": epoch_secs(wall),
        "reason": err.kind_name(),
        "port": err.port(),
        "message": err.to_string(),
    })
    .to_string()
}

pub fn port_line(index: usize, p: &PortDescriptor) -> String {
    format!(
        "{:>3}. {}  {} [{}]",
        index + 1,
        p.device,
        p.description,
        p.manufacturer
    )
}

pub fn ports_json(ports: &[PortDescriptor]) -> String {
    let list: Vec<_> = ports
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "index": i + 1,
                "device": p.device,
                "description": p.description,
                "manufacturer": p.manufacturer,
            })
        })
        .collect();
    serde_json::Value::Array(list).to_string()
}
