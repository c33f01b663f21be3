use thiserror::Error;

/// Failures of the live serial link. Every variant names the port it
/// concerns; OS detail is kept as text so the error stays `Clone`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("serial port {port} not found")]
    PortNotFound { port: String },
    #[error("serial port {port} is busy (held by another process)")]
    Busy { port: String },
    #[error("io failure on serial port {port}: {message}")]
    IoFailure { port: String, message: String },
    #[error("serial port {port} disconnected: {message}")]
    Disconnected { port: String, message: String },
}

impl ConnectionError {
    pub fn port(&self) -> &str {
        match self {
            Self::PortNotFound { port }
            | Self::Busy { port }
            | Self::IoFailure { port, .. }
            | Self::Disconnected { port, .. } => port,
        }
    }

    /// Stable short name, used for structured logs and JSON output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PortNotFound { .. } => "PortNotFound",
            Self::Busy { .. } => "Busy",
            Self::IoFailure { .. } => "IoFailure",
            Self::Disconnected { .. } => "Disconnected",
        }
    }
}
