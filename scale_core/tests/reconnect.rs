use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rstest::rstest;
use scale_core::mocks::ScriptedSource;
use scale_core::{LoopExit, ReconnectPolicy, SampleEvent, SamplingLoop, run_supervised};
use scale_hardware::frame;
use scale_traits::ConnectionError;
use scale_traits::clock::test_clock::TestClock;

fn lost(message: &str) -> ConnectionError {
    ConnectionError::Disconnected {
        port: "COM3".into(),
        message: message.into(),
    }
}

fn busy() -> ConnectionError {
    ConnectionError::Busy {
        port: "COM3".into(),
    }
}

fn policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1000),
        max_backoff: Duration::from_millis(5000),
    }
}

#[test]
fn resumes_sampling_after_successful_reopen() {
    let clock = TestClock::new();
    let sampling = SamplingLoop::new(Duration::from_millis(100), clock.clone());
    let mut source = ScriptedSource::new(vec![
        Ok(Some(frame::parse("1 kg"))),
        Err(lost("unplugged")),
        Ok(Some(frame::parse("2 kg"))),
        Err(lost("unplugged again")),
    ])
    .with_reconnects(vec![Err(busy()), Ok(()), Err(busy()), Err(busy())]);
    let shutdown = AtomicBool::new(false);
    let mut weights = Vec::new();
    let mut terminals = 0;

    let exit = run_supervised(&mut source, &sampling, &policy(2), &shutdown, |e| match e {
        SampleEvent::Reading(r) => weights.push(r.reading.value_kg().unwrap()),
        SampleEvent::Terminal(_) => terminals += 1,
    });

    assert_eq!(weights, vec![1.0, 2.0]);
    assert_eq!(terminals, 2);
    // Second outage: both attempts fail with Busy, which is reported.
    assert_eq!(exit, LoopExit::Terminated(busy()));
    assert_eq!(source.reconnect_calls, 4);
}

#[rstest]
#[case(1, 1000)]
#[case(3, 1000 + 2000 + 4000)]
#[case(5, 1000 + 2000 + 4000 + 5000 + 5000)]
fn exhaustion_waits_the_full_backoff_schedule(#[case] attempts: u32, #[case] waited_ms: u64) {
    let clock = TestClock::new();
    let sampling = SamplingLoop::new(Duration::from_millis(100), clock.clone());
    let mut source = ScriptedSource::new(vec![Err(lost("gone"))]);
    let shutdown = AtomicBool::new(false);

    let exit = run_supervised(&mut source, &sampling, &policy(attempts), &shutdown, |_| {});

    assert!(matches!(exit, LoopExit::Terminated(ConnectionError::Disconnected { .. })));
    assert_eq!(source.reconnect_calls, attempts as usize);
    assert_eq!(clock.elapsed(), Duration::from_millis(waited_ms));
}

#[test]
fn disabled_policy_returns_the_first_error() {
    let sampling = SamplingLoop::new(Duration::from_millis(100), TestClock::new());
    let mut source = ScriptedSource::new(vec![Err(lost("gone"))]);
    let shutdown = AtomicBool::new(false);
    let exit = run_supervised(
        &mut source,
        &sampling,
        &ReconnectPolicy::disabled(),
        &shutdown,
        |_| {},
    );
    assert_eq!(exit, LoopExit::Terminated(lost("gone")));
    assert_eq!(source.reconnect_calls, 0);
}

#[test]
fn interrupt_during_backoff_stops_promptly() {
    let clock = TestClock::new();
    let sampling = SamplingLoop::new(Duration::from_millis(100), clock.clone());
    let mut source = ScriptedSource::new(vec![Err(lost("gone"))]);
    let shutdown = AtomicBool::new(false);

    // The consumer sees the terminal event and requests shutdown before
    // the first backoff sleep begins.
    let exit = run_supervised(&mut source, &sampling, &policy(5), &shutdown, |e| {
        if matches!(e, SampleEvent::Terminal(_)) {
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    assert_eq!(exit, LoopExit::Interrupted);
    assert_eq!(source.reconnect_calls, 0);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}
