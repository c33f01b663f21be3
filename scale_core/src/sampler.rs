//! Periodic sampling of a weight source.
//!
//! `SamplingLoop` is the synchronous poll/stamp/sleep cycle used by the
//! console. `Sampler` runs the same loop on a background thread that owns
//! the source and hands events over a bounded channel; when the consumer
//! falls behind, events are dropped rather than queued.
//!
//! Each `Sampler` spawns exactly one thread, which is shut down and joined
//! when the `Sampler` is dropped.
use crossbeam_channel as xch;
use scale_traits::{
    Clock, ConnectionError, MonotonicClock, Reading, Reconnect, TimestampedReading, WeightSource,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::reconnect::{ReconnectPolicy, run_supervised};
use crate::util::sleep_unless_shutdown;

/// Default pause between polls.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
/// Capacity of the background sampler's event channel.
pub const CHANNEL_CAPACITY: usize = 64;

/// One observation handed to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleEvent {
    Reading(TimestampedReading),
    /// The source failed; the loop stops after delivering this.
    Terminal(ConnectionError),
}

/// Why a sampling loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// Shutdown was requested.
    Interrupted,
    Terminated(ConnectionError),
}

pub struct SamplingLoop<C: Clock = MonotonicClock> {
    interval: Duration,
    clock: C,
}

impl Default for SamplingLoop<MonotonicClock> {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, MonotonicClock::new())
    }
}

impl<C: Clock> SamplingLoop<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self { interval, clock }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Attach capture times to a reading.
    pub fn stamp(&self, reading: Reading) -> TimestampedReading {
        TimestampedReading {
            monotonic: self.clock.now(),
            wall: self.clock.wall(),
            reading,
        }
    }

    /// Poll once. Empty polls yield `None`.
    pub fn poll_once<S: WeightSource + ?Sized>(&self, source: &mut S) -> Option<SampleEvent> {
        match source.poll() {
            Ok(Some(reading)) => Some(SampleEvent::Reading(self.stamp(reading))),
            Ok(None) => None,
            Err(e) => Some(SampleEvent::Terminal(e)),
        }
    }

    /// Poll until shutdown is raised or the source fails.
    ///
    /// Every reading, parsed or not, reaches `consumer` in capture order. A
    /// failure is delivered as `SampleEvent::Terminal` and ends the loop.
    pub fn run<S, F>(&self, source: &mut S, shutdown: &AtomicBool, mut consumer: F) -> LoopExit
    where
        S: WeightSource + ?Sized,
        F: FnMut(SampleEvent),
    {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return LoopExit::Interrupted;
            }
            match self.poll_once(source) {
                Some(SampleEvent::Terminal(e)) => {
                    tracing::warn!(port = e.port(), error = %e, "weight source failed");
                    consumer(SampleEvent::Terminal(e.clone()));
                    return LoopExit::Terminated(e);
                }
                Some(event) => consumer(event),
                None => tracing::trace!("empty poll"),
            }
            if !sleep_unless_shutdown(&self.clock, self.interval, shutdown) {
                return LoopExit::Interrupted;
            }
        }
    }
}

/// Sampling loop on a background thread.
pub struct Sampler {
    rx: xch::Receiver<SampleEvent>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<LoopExit>>,
}

impl Sampler {
    /// Run `sampling` over `source` until dropped or the source fails.
    pub fn spawn<S, C>(source: S, sampling: SamplingLoop<C>) -> Self
    where
        S: WeightSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        Self::start(move |shutdown, emit| {
            let mut source = source;
            sampling.run(&mut source, shutdown, emit)
        })
    }

    /// Like `spawn`, but a dropped link is reopened according to `policy`.
    pub fn spawn_supervised<S, C>(
        source: S,
        sampling: SamplingLoop<C>,
        policy: ReconnectPolicy,
    ) -> Self
    where
        S: Reconnect + Send + 'static,
        C: Clock + Send + 'static,
    {
        Self::start(move |shutdown, emit| {
            let mut source = source;
            run_supervised(&mut source, &sampling, &policy, shutdown, emit)
        })
    }

    fn start<B>(body: B) -> Self
    where
        B: FnOnce(&AtomicBool, &mut dyn FnMut(SampleEvent)) -> LoopExit + Send + 'static,
    {
        let (tx, rx) = xch::bounded(CHANNEL_CAPACITY);
        // Used only to evict the oldest event when a terminal status must fit
        let evict = rx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            let mut emit = |event: SampleEvent| {
                let mut pending = event;
                loop {
                    match tx.try_send(pending) {
                        Ok(()) => return,
                        Err(xch::TrySendError::Full(e @ SampleEvent::Terminal(_))) => {
                            // Readings may be dropped; a terminal status may not
                            let _ = evict.try_recv();
                            tracing::trace!("sampler channel full; evicted oldest event");
                            pending = e;
                        }
                        Err(xch::TrySendError::Full(_)) => {
                            tracing::trace!("sampler channel full; dropping event");
                            return;
                        }
                        Err(xch::TrySendError::Disconnected(_)) => {
                            // Consumer is gone; stop at the next check
                            shutdown_clone.store(true, Ordering::Relaxed);
                            return;
                        }
                    }
                }
            };
            let exit = body(&shutdown_clone, &mut emit);
            tracing::trace!(?exit, "sampler thread exiting cleanly");
            exit
        });

        Self {
            rx,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Most recent event, discarding anything older.
    pub fn latest(&self) -> Option<SampleEvent> {
        self.rx.try_iter().last()
    }

    /// Next event in order, waiting up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SampleEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// True once the sampling thread has returned.
    pub fn is_finished(&self) -> bool {
        self.join_handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the thread and report how the loop ended.
    pub fn stop(mut self) -> Option<LoopExit> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> Option<LoopExit> {
        self.shutdown.store(true, Ordering::Relaxed);
        let handle = self.join_handle.take()?;
        match handle.join() {
            Ok(exit) => Some(exit),
            Err(e) => {
                // Thread panicked; log but don't propagate
                tracing::warn!(?e, "sampler thread panicked during shutdown");
                None
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Thread exits at its next shutdown check; the longest wait is one
        // in-flight poll plus one sleep slice.
        let _ = self.shutdown_and_join();
    }
}
