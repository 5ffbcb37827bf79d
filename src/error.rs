use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the register write pipeline.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Device read error: {0}")]
    DeviceRead(String),
    #[error("Device write error: {0}")]
    DeviceWrite(String),
    #[error("Read/Write timeout")]
    Timeout(Duration),
}

pub type WriteResult<T> = Result<T, WriteError>;
