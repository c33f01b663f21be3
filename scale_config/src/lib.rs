#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the scale reader.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration. Serial line parameters are deliberately absent: they are
//! fixed by the device.
use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Serial {
    /// Device to open when none is given on the command line (e.g. "COM3").
    pub port: Option<String>,
    /// Command sent before each read for scales that answer on request
    /// (NCI: "W" or "P"). Absent: listen only.
    pub request: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Simulation {
    pub target_weight_kg: f64,
    pub cycle_seconds: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            target_weight_kg: 5.0,
            cycle_seconds: 15.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Sampling {
    /// Pause between polls in console mode.
    pub interval_ms: u64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Reconnect {
    /// Reopen attempts after the link drops (0 disables reconnecting)
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for Reconnect {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1000,
            max_backoff_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Debounce {
    /// Consecutive near-zero readings before the display drops to zero (0 disables)
    pub zero_readings: u32,
    /// Readings below this many kg count as zero
    pub zero_epsilon_kg: f64,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            zero_readings: 5,
            zero_epsilon_kg: 0.05,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub serial: Serial,
    pub simulation: Simulation,
    pub sampling: Sampling,
    pub reconnect: Reconnect,
    pub debounce: Debounce,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Simulation
        let sim = &self.simulation;
        if !(sim.target_weight_kg.is_finite() && sim.target_weight_kg > 0.0) {
            eyre::bail!("simulation.target_weight_kg must be > 0");
        }
        if !(sim.cycle_seconds.is_finite() && sim.cycle_seconds > 0.0) {
            eyre::bail!("simulation.cycle_seconds must be > 0");
        }

        // Sampling
        if self.sampling.interval_ms == 0 {
            eyre::bail!("sampling.interval_ms must be >= 1");
        }
        if self.sampling.interval_ms > 60 * 1000 {
            eyre::bail!("sampling.interval_ms is unreasonably large (>60s)");
        }

        // Reconnect
        let rc = &self.reconnect;
        if rc.max_attempts > 0 && rc.initial_backoff_ms == 0 {
            eyre::bail!("reconnect.initial_backoff_ms must be >= 1 when reconnecting");
        }
        if rc.max_backoff_ms < rc.initial_backoff_ms {
            eyre::bail!("reconnect.max_backoff_ms must be >= reconnect.initial_backoff_ms");
        }

        // Debounce
        let db = &self.debounce;
        if !(db.zero_epsilon_kg.is_finite() && db.zero_epsilon_kg >= 0.0) {
            eyre::bail!("debounce.zero_epsilon_kg must be >= 0");
        }

        // Serial
        if let Some(port) = &self.serial.port
            && port.trim().is_empty()
        {
            eyre::bail!("serial.port must not be empty when set");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
