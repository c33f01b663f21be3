#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Weight sources: the live serial scale and its simulator.
//!
//! - `frame`: parses one line of scale output into a `Reading`
//! - `connection`: port discovery and the open/poll/close lifecycle
//! - `serial`: the `serialport`-backed provider used in production
//! - `simulated`: deterministic fill/drain generator with manual override

pub mod connection;
pub mod error;
pub mod frame;
pub mod serial;
pub mod simulated;
pub mod util;

pub use connection::{
    ConnectionManager, ConnectionState, LineSettings, LineTransport, PortDescriptor, PortProvider,
    SCALE_LINE, select_port,
};
pub use serial::{SerialLine, SystemPorts};
pub use simulated::{SimulatedSource, SimulationClock, simulated_weight};

/// Connection manager over the machine's real serial ports.
pub type LiveSerialSource = ConnectionManager<SystemPorts>;

impl LiveSerialSource {
    pub fn system() -> Self {
        ConnectionManager::new(SystemPorts::new())
    }
}
