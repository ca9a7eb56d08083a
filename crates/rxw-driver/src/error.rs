//! Error types for receiver control

use thiserror::Error;

use rxw_transport::LinkError;

/// Errors from receiver control operations
#[derive(Debug, Error)]
pub enum RadioError {
    /// Transport failure on the underlying link
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Status polling exhausted its budget without confirmation
    #[error("no confirmation after {attempts} polls")]
    ConfirmTimeout { attempts: u32 },

    /// Device answered NAK to a toggle command
    #[error("command 0x{code:02X} rejected by device")]
    Nack { code: u8 },

    /// Operation needs a capability this receiver lacks
    #[error("receiver does not support {0}")]
    Unsupported(&'static str),

    /// Malformed or unrecognised reply byte
    #[error("protocol error: {0}")]
    Protocol(#[from] rxw_protocol::ProtocolError),
}
