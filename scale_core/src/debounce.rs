//! Hold the last stable weight through brief zero dips.
//!
//! A bag lifted for a moment reads as zero; the display should only drop to
//! zero once that has persisted for several consecutive readings.

use scale_traits::round2;

pub const DEFAULT_ZERO_READINGS: u32 = 5;
pub const DEFAULT_ZERO_EPSILON_KG: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct ZeroDebouncer {
    threshold: u32,
    epsilon_kg: f64,
    last_stable: f64,
    zero_run: u32,
}

impl Default for ZeroDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_READINGS, DEFAULT_ZERO_EPSILON_KG)
    }
}

impl ZeroDebouncer {
    /// `threshold` of 0 disables debouncing.
    pub fn new(threshold: u32, epsilon_kg: f64) -> Self {
        Self {
            threshold,
            epsilon_kg: epsilon_kg.max(0.0),
            last_stable: 0.0,
            zero_run: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, 0.0)
    }

    /// Feed one reading in kg; returns the weight to display.
    pub fn apply(&mut self, weight_kg: f64) -> f64 {
        let w = round2(weight_kg.max(0.0));
        if self.threshold == 0 {
            return w;
        }
        if w < self.epsilon_kg {
            self.zero_run = self.zero_run.saturating_add(1);
            if self.zero_run >= self.threshold {
                if self.last_stable != 0.0 {
                    tracing::debug!(readings = self.zero_run, "zero confirmed");
                }
                self.last_stable = 0.0;
            }
            self.last_stable
        } else {
            self.zero_run = 0;
            self.last_stable = w;
            w
        }
    }

    /// Start over from `weight_kg`, e.g. after a manual override.
    pub fn reset_to(&mut self, weight_kg: f64) {
        self.last_stable = round2(weight_kg.max(0.0));
        self.zero_run = 0;
    }
}
