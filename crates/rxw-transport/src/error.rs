//! Error types for device links

use std::time::Duration;

use thiserror::Error;

/// Errors from device links
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to enumerate serial devices
    #[error("failed to enumerate serial devices: {0}")]
    Enumeration(String),

    /// Failed to open the device
    #[error("failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    /// I/O attempted before `open` (or after `close`)
    #[error("device not open")]
    NotOpen,

    /// Rejected port parameter
    #[error("unsupported configuration: {0}")]
    Config(String),

    /// No complete response within the read timeout
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error on the underlying port
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
