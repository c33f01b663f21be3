//! Ctrl-C handling.
//!
//! Until a command arms the handle, an interrupt ends the process at once
//! (nothing is open yet, e.g. while waiting at the port prompt). Once
//! armed, it only raises the shutdown flag and the sampling loop closes
//! the port on its normal exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;

/// Conventional exit status for a process ended by SIGINT.
pub const INTERRUPTED_EXIT: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Exit,
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    shutdown: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
}

impl Interrupt {
    /// Install the process-wide Ctrl-C handler.
    pub fn install() -> eyre::Result<Self> {
        let handle = Self::default();
        let on_signal = handle.clone();
        ctrlc::set_handler(move || {
            if on_signal.on_signal() == SignalAction::Exit {
                std::process::exit(INTERRUPTED_EXIT);
            }
        })
        .wrap_err("install Ctrl-C handler")?;
        Ok(handle)
    }

    /// From now on an interrupt requests a cooperative stop.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn on_signal(&self) -> SignalAction {
        if self.armed.load(Ordering::Acquire) {
            self.shutdown.store(true, Ordering::Relaxed);
            SignalAction::Stop
        } else {
            SignalAction::Exit
        }
    }
}
