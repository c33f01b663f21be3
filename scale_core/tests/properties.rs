use std::time::Duration;

use proptest::prelude::*;
use scale_core::{ReconnectPolicy, ZeroDebouncer};

proptest! {
    #[test]
    fn backoff_is_monotonic_and_capped(
        initial_ms in 1u64..10_000,
        extra_ms in 0u64..60_000,
        attempt in 1u32..64,
    ) {
        let p = ReconnectPolicy {
            max_attempts: 64,
            initial_backoff: Duration::from_millis(initial_ms),
            max_backoff: Duration::from_millis(initial_ms + extra_ms),
        };
        let a = p.backoff(attempt);
        let b = p.backoff(attempt + 1);
        prop_assert!(a <= b);
        prop_assert!(b <= p.max_backoff);
        prop_assert!(p.backoff(1) == p.initial_backoff);
    }

    #[test]
    fn debounced_weight_is_never_negative(weights in proptest::collection::vec(-10.0f64..10.0, 1..64)) {
        let mut d = ZeroDebouncer::default();
        for w in weights {
            let shown = d.apply(w);
            prop_assert!(shown >= 0.0);
            // A clearly non-zero reading is always shown as-is.
            if w >= 0.05 {
                prop_assert!((shown - w).abs() <= 0.005 + 1e-9);
            }
        }
    }
}
