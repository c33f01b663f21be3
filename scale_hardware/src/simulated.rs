//! Synthetic weight source for running without a scale attached.
//!
//! Weight follows a fill/drain triangle wave with a small deterministic
//! wobble, computed from elapsed time alone, so the stream can be replayed
//! by replaying the clock. The wobble (`sin(2t)`) is not commensurate with
//! the cycle; the stream is only approximately periodic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use scale_traits::{
    Clock, ConnectionError, Measurement, MonotonicClock, Reading, Unit, WeightSource, round2,
};
use tracing::{debug, info, warn};

pub const DEFAULT_TARGET_KG: f64 = 5.0;
pub const DEFAULT_CYCLE_SECS: f64 = 15.0;

/// Fraction of the cycle spent filling; the rest drains.
const FILL_FRACTION: f64 = 0.6;
const JITTER_KG: f64 = 0.05;
const JITTER_RATE: f64 = 2.0;

/// Simulated weight in kg at `t` seconds after start.
pub fn simulated_weight(t: f64, target_kg: f64, cycle_secs: f64) -> f64 {
    let p = t.rem_euclid(cycle_secs) / cycle_secs;
    let base = if p < FILL_FRACTION {
        p / FILL_FRACTION * target_kg
    } else {
        (1.0 - p) / (1.0 - FILL_FRACTION) * target_kg
    };
    let w = round2(base + (t * JITTER_RATE).sin() * JITTER_KG);
    if w > 0.0 { w } else { 0.0 }
}

/// Immutable parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    start: Instant,
    target_weight: f64,
    cycle_seconds: f64,
}

impl SimulationClock {
    /// Non-positive or non-finite parameters fall back to the defaults.
    pub fn new(start: Instant, target_weight: f64, cycle_seconds: f64) -> Self {
        let target_weight = if target_weight.is_finite() && target_weight > 0.0 {
            target_weight
        } else {
            warn!(target_weight, "invalid simulation target; using default");
            DEFAULT_TARGET_KG
        };
        let cycle_seconds = if cycle_seconds.is_finite() && cycle_seconds > 0.0 {
            cycle_seconds
        } else {
            warn!(cycle_seconds, "invalid simulation cycle; using default");
            DEFAULT_CYCLE_SECS
        };
        Self {
            start,
            target_weight,
            cycle_seconds,
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn target_weight(&self) -> f64 {
        self.target_weight
    }

    pub fn cycle_seconds(&self) -> f64 {
        self.cycle_seconds
    }

    pub fn elapsed(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64()
    }

    pub fn weight_at(&self, t: f64) -> f64 {
        simulated_weight(t, self.target_weight, self.cycle_seconds)
    }
}

struct Shared<C> {
    sim: SimulationClock,
    clock: C,
    armed: AtomicBool,
    manual: Mutex<Option<f64>>,
    connected: AtomicBool,
}

/// Simulated scale. Clones share state, so one instance can be handed to
/// many concurrent request handlers: natural polls only read, override
/// writes are serialized behind a mutex (last write wins).
pub struct SimulatedSource<C: Clock = MonotonicClock> {
    shared: Arc<Shared<C>>,
}

impl<C: Clock> Clone for SimulatedSource<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl SimulatedSource<MonotonicClock> {
    pub fn new(target_weight: f64, cycle_seconds: f64) -> Self {
        Self::with_clock(MonotonicClock::new(), target_weight, cycle_seconds)
    }
}

impl Default for SimulatedSource<MonotonicClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_KG, DEFAULT_CYCLE_SECS)
    }
}

impl<C: Clock> SimulatedSource<C> {
    pub fn with_clock(clock: C, target_weight: f64, cycle_seconds: f64) -> Self {
        let sim = SimulationClock::new(clock.now(), target_weight, cycle_seconds);
        Self {
            shared: Arc::new(Shared {
                sim,
                clock,
                armed: AtomicBool::new(false),
                manual: Mutex::new(None),
                connected: AtomicBool::new(true),
            }),
        }
    }

    pub fn simulation(&self) -> &SimulationClock {
        &self.shared.sim
    }

    pub fn target_weight(&self) -> f64 {
        self.shared.sim.target_weight()
    }

    /// Seconds since the simulation started.
    pub fn elapsed(&self) -> f64 {
        self.shared.sim.elapsed(self.shared.clock.now())
    }

    /// Current weight in kg: the override while one is active, otherwise
    /// the generated curve.
    pub fn current_weight(&self) -> f64 {
        self.active_override()
            .unwrap_or_else(|| self.generated_weight())
    }

    fn generated_weight(&self) -> f64 {
        self.shared.sim.weight_at(self.elapsed())
    }

    /// Replace the generated weight until the next natural poll, which
    /// resumes the curve. Negative input clamps to 0; returns the applied
    /// value.
    pub fn set_override(&self, weight_kg: f64) -> f64 {
        let applied = if weight_kg > 0.0 { weight_kg } else { 0.0 };
        let mut manual = self
            .shared
            .manual
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *manual = Some(applied);
        self.shared.armed.store(true, Ordering::Release);
        info!(weight_kg = applied, "manual weight set");
        applied
    }

    pub fn clear_override(&self) {
        let mut manual = self
            .shared
            .manual
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *manual = None;
        self.shared.armed.store(false, Ordering::Release);
    }

    /// The override currently in force, if any.
    pub fn override_weight(&self) -> Option<f64> {
        self.active_override()
    }

    pub fn set_connected(&self, connected: bool) {
        self.shared.connected.store(connected, Ordering::Relaxed);
    }

    /// One reading of the current weight; always parsed, in kg.
    pub fn sample(&self) -> Reading {
        Self::reading(self.current_weight())
    }

    fn reading(w: f64) -> Reading {
        let m = Measurement {
            value_raw: w,
            unit: Unit::Kg,
            value_kg: w,
        };
        Reading::parsed(format!("{w:.2} kg"), m)
    }

    fn active_override(&self) -> Option<f64> {
        // Fast path: no lock unless an override has been set.
        if !self.shared.armed.load(Ordering::Acquire) {
            return None;
        }
        *self
            .shared
            .manual
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// A natural sample: any pending override is dropped and the curve
    /// value is reported.
    fn natural_sample(&self) -> Reading {
        if self.shared.armed.swap(false, Ordering::AcqRel) {
            let mut manual = self
                .shared
                .manual
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if manual.take().is_some() {
                debug!("override replaced by natural sample");
            }
        }
        Self::reading(self.generated_weight())
    }
}

impl<C: Clock> WeightSource for SimulatedSource<C> {
    fn poll(&mut self) -> Result<Option<Reading>, ConnectionError> {
        Ok(Some(self.natural_sample()))
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Relaxed)
    }
}
