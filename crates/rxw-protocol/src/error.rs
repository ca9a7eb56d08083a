//! Error types for the receiver control protocol

use thiserror::Error;

/// Errors in protocol-level decoding and classification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Byte does not name a known command
    #[error("unknown command: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Reply byte outside the values the command can produce
    #[error("unexpected status byte: 0x{0:02X}")]
    BadStatus(u8),

    /// Mode number outside the demodulator table
    #[error("unknown demodulation mode: {0}")]
    UnknownMode(u8),

    /// Interface number outside the attachment table
    #[error("unknown interface kind: {0}")]
    UnknownInterface(u8),
}
