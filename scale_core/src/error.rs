use thiserror::Error;

/// A manual weight override rejected at the boundary; nothing was changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverrideValidationError {
    #[error("override body is not valid JSON: {0}")]
    Malformed(String),
    #[error("override body has no \"weight\" field")]
    MissingWeight,
    #[error("override weight must be a finite number")]
    NotANumber,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
