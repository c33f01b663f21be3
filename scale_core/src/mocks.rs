//! Test and helper mocks for scale_core

use std::collections::VecDeque;

use scale_traits::{ConnectionError, Reading, Reconnect, WeightSource};

/// A weight source that replays a fixed script of poll results, then
/// reports empty polls forever. Reconnect outcomes are scripted separately;
/// an exhausted reconnect script fails with `Disconnected`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    polls: VecDeque<Result<Option<Reading>, ConnectionError>>,
    reconnects: VecDeque<Result<(), ConnectionError>>,
    connected: bool,
    pub poll_calls: usize,
    pub reconnect_calls: usize,
}

impl ScriptedSource {
    pub fn new(polls: Vec<Result<Option<Reading>, ConnectionError>>) -> Self {
        Self {
            polls: polls.into(),
            connected: true,
            ..Self::default()
        }
    }

    pub fn with_reconnects(mut self, outcomes: Vec<Result<(), ConnectionError>>) -> Self {
        self.reconnects = outcomes.into();
        self
    }

    /// Append more poll results, e.g. what the link yields after a reopen.
    pub fn push(&mut self, result: Result<Option<Reading>, ConnectionError>) {
        self.polls.push_back(result);
    }
}

impl WeightSource for ScriptedSource {
    fn poll(&mut self) -> Result<Option<Reading>, ConnectionError> {
        self.poll_calls += 1;
        let next = self.polls.pop_front().unwrap_or(Ok(None));
        if next.is_err() {
            self.connected = false;
        }
        next
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Reconnect for ScriptedSource {
    fn reconnect(&mut self) -> Result<(), ConnectionError> {
        self.reconnect_calls += 1;
        let outcome = self.reconnects.pop_front().unwrap_or_else(|| {
            Err(ConnectionError::Disconnected {
                port: "scripted".into(),
                message: "no reconnect scripted".into(),
            })
        });
        self.connected = outcome.is_ok();
        outcome
    }
}
