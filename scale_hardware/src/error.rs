//! Maps `serialport` failures onto the typed `ConnectionError`.

use std::io;

use scale_traits::ConnectionError;

/// Classify a failure to open `port`.
pub fn map_open_error(port: &str, err: &serialport::Error) -> ConnectionError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => ConnectionError::PortNotFound { port: port.into() },
        serialport::ErrorKind::Io(kind) => map_io_kind(port, kind, &err.to_string()),
        _ => ConnectionError::IoFailure {
            port: port.into(),
            message: err.to_string(),
        },
    }
}

/// Classify an OS-level error kind. Windows reports a port held by another
/// program as "access denied", Unix as `EBUSY`.
pub fn map_io_kind(port: &str, kind: io::ErrorKind, message: &str) -> ConnectionError {
    match kind {
        io::ErrorKind::NotFound => ConnectionError::PortNotFound { port: port.into() },
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy => {
            ConnectionError::Busy { port: port.into() }
        }
        _ if message.to_ascii_lowercase().contains("busy") => {
            ConnectionError::Busy { port: port.into() }
        }
        _ => ConnectionError::IoFailure {
            port: port.into(),
            message: message.into(),
        },
    }
}
