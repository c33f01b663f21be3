//! Bounded reconnect with exponential backoff around a sampling loop.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use scale_traits::{Clock, ConnectionError, Reconnect};
use tracing::{error, info, warn};

use crate::sampler::{LoopExit, SampleEvent, SamplingLoop};
use crate::util::sleep_unless_shutdown;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reopen attempts per outage; 0 makes every failure terminal.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Wait before the 1-based `attempt`: `initial * 2^(attempt-1)`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// Run `sampling` over `source`, reopening the link after each failure.
///
/// Each outage gets up to `policy.max_attempts` reopen attempts. Readings
/// keep flowing to `consumer` after a successful reopen; every failure is
/// also delivered as `SampleEvent::Terminal` so the consumer can report it.
/// Returns when shutdown is raised or an outage exhausts its attempts.
pub fn run_supervised<S, C, F>(
    source: &mut S,
    sampling: &SamplingLoop<C>,
    policy: &ReconnectPolicy,
    shutdown: &AtomicBool,
    mut consumer: F,
) -> LoopExit
where
    S: Reconnect + ?Sized,
    C: Clock,
    F: FnMut(SampleEvent),
{
    loop {
        let lost = match sampling.run(source, shutdown, &mut consumer) {
            LoopExit::Interrupted => return LoopExit::Interrupted,
            LoopExit::Terminated(e) => e,
        };
        if let Err(exit) = reopen(source, sampling.clock(), policy, shutdown, lost) {
            return exit;
        }
    }
}

fn reopen<S, C>(
    source: &mut S,
    clock: &C,
    policy: &ReconnectPolicy,
    shutdown: &AtomicBool,
    lost: ConnectionError,
) -> Result<(), LoopExit>
where
    S: Reconnect + ?Sized,
    C: Clock,
{
    let mut last = lost;
    for attempt in 1..=policy.max_attempts {
        let backoff = policy.backoff(attempt);
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            backoff_ms = backoff.as_millis() as u64,
            error = %last,
            "connection lost; reconnecting"
        );
        if !sleep_unless_shutdown(clock, backoff, shutdown) {
            return Err(LoopExit::Interrupted);
        }
        match source.reconnect() {
            Ok(()) => {
                info!(attempt, port = last.port(), "reconnected");
                return Ok(());
            }
            Err(e) => last = e,
        }
    }
    if policy.max_attempts > 0 {
        error!(attempts = policy.max_attempts, error = %last, "giving up on reconnect");
    }
    Err(LoopExit::Terminated(last))
}
