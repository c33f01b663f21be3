//! Serial connection lifecycle for the live scale.
//!
//! `ConnectionManager` owns the open port and the `ConnectionState`. It is a
//! plain resource wrapper: it never retries on its own, and it releases the
//! device on `close()` or when dropped.

use std::io;
use std::time::Duration;

use scale_traits::{ConnectionError, Reading, Reconnect, WeightSource};
use serialport::{DataBits, Parity, StopBits};
use tracing::{debug, error, info, warn};

use crate::frame;

/// Line parameters of the scale's serial interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub read_timeout: Duration,
}

/// 9600 baud, 8N1, one second read timeout. Part of the device contract,
/// so `open` always uses it.
pub const SCALE_LINE: LineSettings = LineSettings {
    baud_rate: 9600,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
    read_timeout: Duration::from_secs(1),
};

/// An attached serial device, as offered to the operator for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub device: String,
    pub description: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed(ConnectionError),
}

/// A byte stream that yields one line per read.
pub trait LineTransport {
    /// Read one line without its terminator. `Ok(None)` means nothing
    /// complete arrived within the read timeout.
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Where ports come from: the OS in production, a script in tests.
pub trait PortProvider {
    type Transport: LineTransport;

    fn ports(&self) -> Vec<PortDescriptor>;
    fn open(&self, port: &str, settings: &LineSettings) -> Result<Self::Transport, ConnectionError>;
}

pub struct ConnectionManager<P: PortProvider> {
    provider: P,
    state: ConnectionState,
    port: Option<String>,
    transport: Option<P::Transport>,
    request: Option<Vec<u8>>,
}

impl<P: PortProvider> ConnectionManager<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: ConnectionState::Disconnected,
            port: None,
            transport: None,
            request: None,
        }
    }

    /// Send `<command>\r\n` before every read, for scales that only answer
    /// when asked (NCI `W`/`P`). An empty command disables it.
    pub fn with_request(mut self, command: &str) -> Self {
        let command = command.trim();
        self.request = if command.is_empty() {
            None
        } else {
            Some(format!("{command}\r\n").into_bytes())
        };
        self
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Name of the port last passed to `open`.
    pub fn port_name(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Enumerate attached devices. The OS is only queried once the iterator
    /// is first advanced; call again for a fresh enumeration.
    pub fn discover(&self) -> impl Iterator<Item = PortDescriptor> + '_ {
        std::iter::once(()).flat_map(move |()| self.provider.ports())
    }

    pub fn open(&mut self, port: &str) -> Result<(), ConnectionError> {
        if self.transport.is_some() {
            self.close();
        }
        self.port = Some(port.to_string());
        self.transition(ConnectionState::Connecting);
        match self.provider.open(port, &SCALE_LINE) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.transition(ConnectionState::Connected);
                info!(
                    port,
                    baud = SCALE_LINE.baud_rate,
                    "connected to scale (8N1, 1s timeout)"
                );
                Ok(())
            }
            Err(e) => {
                warn!(port, error = %e, "failed to open scale port");
                self.transition(ConnectionState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// One bounded line read. `Ok(None)` for an empty read; a transport
    /// failure moves to `Failed` and reports `Disconnected`.
    pub fn poll(&mut self) -> Result<Option<Reading>, ConnectionError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(ConnectionError::Disconnected {
                port: self.port.clone().unwrap_or_default(),
                message: "port is not open".into(),
            });
        };
        if let Some(request) = &self.request
            && let Err(e) = transport.write_all(request)
        {
            return Err(self.fail(e));
        }
        match transport.read_line() {
            Ok(None) => Ok(None),
            Ok(Some(bytes)) => {
                let reading = frame::parse_bytes(&bytes);
                if let Some(r) = &reading {
                    debug!(raw = %r.raw_text, parsed = r.is_parsed(), "frame");
                }
                Ok(reading)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Release the device. Idempotent.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            info!(port = self.port.as_deref().unwrap_or(""), "disconnected from scale");
        }
        if self.state != ConnectionState::Disconnected {
            self.transition(ConnectionState::Disconnected);
        }
    }

    fn fail(&mut self, e: io::Error) -> ConnectionError {
        self.transport = None;
        let err = ConnectionError::Disconnected {
            port: self.port.clone().unwrap_or_default(),
            message: e.to_string(),
        };
        error!(error = %err, "serial transport failed");
        self.transition(ConnectionState::Failed(err.clone()));
        err
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!(from = ?self.state, to = ?next, "connection state");
        self.state = next;
    }
}

impl<P: PortProvider> Drop for ConnectionManager<P> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<P: PortProvider> WeightSource for ConnectionManager<P> {
    fn poll(&mut self) -> Result<Option<Reading>, ConnectionError> {
        ConnectionManager::poll(self)
    }

    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl<P: PortProvider> Reconnect for ConnectionManager<P> {
    fn reconnect(&mut self) -> Result<(), ConnectionError> {
        match self.port.clone() {
            Some(port) => self.open(&port),
            None => Err(ConnectionError::PortNotFound {
                port: String::new(),
            }),
        }
    }
}

/// Resolve an operator's choice against an enumeration: a 1-based index,
/// or a literal device name. `com3` is normalized to `COM3`; other names
/// are taken verbatim.
pub fn select_port(ports: &[PortDescriptor], choice: &str) -> Option<String> {
    let choice = choice.trim();
    if choice.is_empty() {
        return None;
    }
    if let Ok(idx) = choice.parse::<usize>()
        && let Some(p) = idx.checked_sub(1).and_then(|i| ports.get(i))
    {
        return Some(p.device.clone());
    }
    let is_com = choice
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("com"));
    if is_com {
        Some(choice.to_ascii_uppercase())
    } else {
        Some(choice.to_string())
    }
}
