//! OS serial ports via the `serialport` crate.

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use scale_traits::ConnectionError;
use serialport::{FlowControl, SerialPort, SerialPortInfo, SerialPortType};
use tracing::{trace, warn};

use crate::connection::{LineSettings, LineTransport, PortDescriptor, PortProvider};
use crate::error::map_open_error;
use crate::util::LineAssembler;

/// Pause between reads that return no bytes without timing out.
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Ports attached to this machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl SystemPorts {
    pub fn new() -> Self {
        Self
    }

    /// A name is openable if it is enumerated or exists as a device path.
    fn is_known(&self, port: &str) -> bool {
        Path::new(port).exists()
            || self
                .ports()
                .iter()
                .any(|p| p.device.eq_ignore_ascii_case(port))
    }
}

impl PortProvider for SystemPorts {
    type Transport = SerialLine;

    fn ports(&self) -> Vec<PortDescriptor> {
        match serialport::available_ports() {
            Ok(list) => list.into_iter().map(PortDescriptor::from).collect(),
            Err(e) => {
                warn!(error = %e, "serial port enumeration failed");
                Vec::new()
            }
        }
    }

    fn open(&self, port: &str, settings: &LineSettings) -> Result<SerialLine, ConnectionError> {
        if !self.is_known(port) {
            return Err(ConnectionError::PortNotFound { port: port.into() });
        }
        let handle = serialport::new(port, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| map_open_error(port, &e))?;
        Ok(SerialLine::new(handle, settings.read_timeout))
    }
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let (description, manufacturer) = match info.port_type {
            SerialPortType::UsbPort(usb) => (
                usb.product
                    .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid)),
                usb.manufacturer.unwrap_or_default(),
            ),
            SerialPortType::BluetoothPort => ("Bluetooth".to_string(), String::new()),
            SerialPortType::PciPort => ("PCI".to_string(), String::new()),
            SerialPortType::Unknown => ("Unknown".to_string(), String::new()),
        };
        Self {
            device: info.port_name,
            description,
            manufacturer,
        }
    }
}

/// An open serial port read line by line.
pub struct SerialLine {
    port: Box<dyn SerialPort>,
    lines: LineAssembler,
    timeout: Duration,
}

impl SerialLine {
    pub fn new(port: Box<dyn SerialPort>, timeout: Duration) -> Self {
        Self {
            port,
            lines: LineAssembler::new(),
            timeout,
        }
    }
}

impl LineTransport for SerialLine {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if let Some(line) = self.lines.next_line() {
            return Ok(Some(line));
        }
        let deadline = Instant::now() + self.timeout;
        let mut chunk = [0u8; 256];
        loop {
            match self.port.read(&mut chunk) {
                Ok(0) => std::thread::sleep(IDLE_BACKOFF),
                Ok(n) => {
                    trace!(bytes = n, "serial read");
                    self.lines.push(&chunk[..n]);
                    if let Some(line) = self.lines.next_line() {
                        return Ok(Some(line));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}
