//! Normalized weight readings.

use std::fmt;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Kilograms per avoirdupois pound, as used by the scale firmware.
pub const KG_PER_LB: f64 = 0.453592;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Kg,
    Lb,
}

impl Unit {
    /// Parse a unit token case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("kg") {
            Some(Self::Kg)
        } else if token.eq_ignore_ascii_case("lb") {
            Some(Self::Lb)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lb => "lb",
        }
    }

    #[inline]
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lb => value * KG_PER_LB,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The numeric part of a successfully parsed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value_raw: f64,
    pub unit: Unit,
    pub value_kg: f64,
}

impl Measurement {
    /// Build a measurement, deriving `value_kg` from the unit.
    /// Returns `None` for negative or non-finite values.
    pub fn new(value_raw: f64, unit: Unit) -> Option<Self> {
        if !value_raw.is_finite() || value_raw < 0.0 {
            return None;
        }
        Some(Self {
            value_raw,
            unit,
            value_kg: unit.to_kg(value_raw),
        })
    }
}

/// One observation from a weight source. Unparsed frames keep their text
/// for diagnostics and carry no measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub raw_text: String,
    pub measurement: Option<Measurement>,
}

impl Reading {
    pub fn parsed(raw_text: impl Into<String>, measurement: Measurement) -> Self {
        Self {
            raw_text: raw_text.into(),
            measurement: Some(measurement),
        }
    }

    pub fn unparsed(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            measurement: None,
        }
    }

    #[inline]
    pub fn is_parsed(&self) -> bool {
        self.measurement.is_some()
    }

    #[inline]
    pub fn value_kg(&self) -> Option<f64> {
        self.measurement.map(|m| m.value_kg)
    }
}

/// A reading stamped by the sampling loop, so timestamps from different
/// sources share one timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedReading {
    pub monotonic: Instant,
    pub wall: SystemTime,
    pub reading: Reading,
}

impl TimestampedReading {
    /// Wall time as float seconds since the Unix epoch (0.0 before the epoch).
    pub fn epoch_secs(&self) -> f64 {
        epoch_secs(self.wall)
    }
}

/// Float seconds since the Unix epoch, 0.0 for times before it.
pub fn epoch_secs(t: SystemTime) -> f64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Round to two decimals (centi-kilogram resolution of the display).
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Fill progress toward `target_kg` as a whole percent in 0..=100.
/// A non-positive target reports 0.
pub fn percent_complete(weight_kg: f64, target_kg: f64) -> u8 {
    if !(target_kg > 0.0) || !weight_kg.is_finite() {
        return 0;
    }
    (weight_kg / target_kg * 100.0).round().clamp(0.0, 100.0) as u8
}
