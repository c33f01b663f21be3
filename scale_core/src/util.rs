//! Timing helpers shared by the sampling loop and the reconnect supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scale_traits::Clock;

/// Longest uninterrupted sleep; bounds how long an interrupt can go unseen.
pub const SHUTDOWN_SLICE: Duration = Duration::from_millis(100);

/// Sleep for `d` in slices of at most `SHUTDOWN_SLICE`.
/// Returns `false` if `shutdown` was raised before the time was up.
pub fn sleep_unless_shutdown<C: Clock + ?Sized>(
    clock: &C,
    d: Duration,
    shutdown: &AtomicBool,
) -> bool {
    let mut left = d;
    while !left.is_zero() {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let step = left.min(SHUTDOWN_SLICE);
        clock.sleep(step);
        left -= step;
    }
    !shutdown.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_traits::clock::test_clock::TestClock;

    #[test]
    fn sleeps_in_slices() {
        let clock = TestClock::new();
        let flag = AtomicBool::new(false);
        assert!(sleep_unless_shutdown(&clock, Duration::from_millis(350), &flag));
        assert_eq!(clock.elapsed(), Duration::from_millis(350));
    }

    #[test]
    fn returns_early_on_shutdown() {
        let clock = TestClock::new();
        let flag = AtomicBool::new(true);
        assert!(!sleep_unless_shutdown(&clock, Duration::from_secs(5), &flag));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
