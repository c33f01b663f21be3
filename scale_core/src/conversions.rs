//! Config sections to core types.

use std::time::Duration;

use scale_config as cfg;
use scale_hardware::SimulatedSource;
use scale_traits::MonotonicClock;

use crate::debounce::ZeroDebouncer;
use crate::reconnect::ReconnectPolicy;
use crate::sampler::SamplingLoop;

impl From<&cfg::Reconnect> for ReconnectPolicy {
    fn from(c: &cfg::Reconnect) -> Self {
        Self {
            max_attempts: c.max_attempts,
            initial_backoff: Duration::from_millis(c.initial_backoff_ms),
            max_backoff: Duration::from_millis(c.max_backoff_ms.max(c.initial_backoff_ms)),
        }
    }
}

impl From<&cfg::Debounce> for ZeroDebouncer {
    fn from(c: &cfg::Debounce) -> Self {
        Self::new(c.zero_readings, c.zero_epsilon_kg)
    }
}

impl From<&cfg::Sampling> for SamplingLoop<MonotonicClock> {
    fn from(c: &cfg::Sampling) -> Self {
        Self::new(
            Duration::from_millis(c.interval_ms.max(1)),
            MonotonicClock::new(),
        )
    }
}

/// Simulator with the configured target and cycle.
pub fn simulator(c: &cfg::Simulation) -> SimulatedSource {
    SimulatedSource::new(c.target_weight_kg, c.cycle_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_core_defaults() {
        let c = cfg::Config::default();
        assert_eq!(ReconnectPolicy::from(&c.reconnect), ReconnectPolicy::default());
        assert_eq!(ZeroDebouncer::from(&c.debounce), ZeroDebouncer::default());
        let sampling: SamplingLoop = SamplingLoop::from(&c.sampling);
        assert_eq!(sampling.interval(), Duration::from_millis(100));
        assert_eq!(simulator(&c.simulation).target_weight(), 5.0);
    }
}
