//! JSON shapes exchanged with request-driven consumers.

use std::time::SystemTime;

use scale_hardware::SimulatedSource;
use scale_traits::{
    Clock, TimestampedReading, WeightSource, epoch_secs, percent_complete, round2,
};
use serde::{Deserialize, Serialize};

use crate::error::OverrideValidationError;

/// One weight observation as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPayload {
    /// kg, 2 decimals
    pub weight: f64,
    pub target_weight: f64,
    pub percent_complete: u8,
    pub is_connected: bool,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl WeightPayload {
    pub fn new(weight_kg: f64, target_kg: f64, is_connected: bool, wall: SystemTime) -> Self {
        let weight = round2(weight_kg.max(0.0));
        Self {
            weight,
            target_weight: target_kg,
            percent_complete: percent_complete(weight, target_kg),
            is_connected,
            timestamp: epoch_secs(wall),
        }
    }

    /// Payload for a parsed reading; `None` when the frame carried no weight.
    pub fn from_reading(
        reading: &TimestampedReading,
        target_kg: f64,
        is_connected: bool,
    ) -> Option<Self> {
        let kg = reading.reading.value_kg()?;
        Some(Self::new(kg, target_kg, is_connected, reading.wall))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideResponse {
    pub success: bool,
    /// The weight actually applied after clamping.
    pub weight: f64,
}

/// Validate an override body of the form `{"weight": <number>}`.
///
/// Negative weights pass validation; the simulator clamps them on apply.
pub fn parse_override(body: &str) -> Result<f64, OverrideValidationError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| OverrideValidationError::Malformed(e.to_string()))?;
    let weight = value
        .get("weight")
        .ok_or(OverrideValidationError::MissingWeight)?;
    weight
        .as_f64()
        .filter(|w| w.is_finite())
        .ok_or(OverrideValidationError::NotANumber)
}

/// Validate `body` and apply it to the simulator. On error nothing changes.
pub fn apply_override<C: Clock>(
    source: &SimulatedSource<C>,
    body: &str,
) -> Result<OverrideResponse, OverrideValidationError> {
    let requested = parse_override(body)?;
    let weight = source.set_override(requested);
    Ok(OverrideResponse {
        success: true,
        weight,
    })
}

/// The simulator's current state as a payload.
pub fn simulated_payload<C: Clock>(source: &SimulatedSource<C>, clock: &C) -> WeightPayload {
    WeightPayload::new(
        source.current_weight(),
        source.target_weight(),
        source.is_connected(),
        clock.wall(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn payload_serializes_camel_case() {
        let wall = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_250);
        let p = WeightPayload::new(2.504, 5.0, true, wall);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["weight"], 2.5);
        assert_eq!(json["targetWeight"], 5.0);
        assert_eq!(json["percentComplete"], 50);
        assert_eq!(json["isConnected"], true);
        assert_eq!(json["timestamp"], 1_700_000_000.25);
    }

    #[rstest]
    #[case(r#"{"weight": 2.5}"#, 2.5)]
    #[case(r#"{"weight": -3}"#, -3.0)]
    #[case(r#"{"weight": 0, "note": "tare"}"#, 0.0)]
    fn accepts_numeric_weight(#[case] body: &str, #[case] expected: f64) {
        assert_eq!(parse_override(body).unwrap(), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"weight": "heavy"}"#)]
    #[case(r#"{"weight": null}"#)]
    #[case(r#"{"kg": 1.0}"#)]
    #[case("[1.0]")]
    fn rejects_bad_bodies(#[case] body: &str) {
        assert!(parse_override(body).is_err(), "{body}");
    }

    #[test]
    fn missing_weight_is_named() {
        assert_eq!(
            parse_override(r#"{"kg": 1.0}"#),
            Err(OverrideValidationError::MissingWeight)
        );
        assert_eq!(
            parse_override(r#"{"weight": "1.0"}"#),
            Err(OverrideValidationError::NotANumber)
        );
    }
}
