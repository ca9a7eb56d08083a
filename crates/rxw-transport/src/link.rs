//! Device link abstraction
//!
//! Receivers are controlled over a byte-oriented, connection-like channel.
//! [`DeviceLink`] is that seam: the production implementation drives a
//! serial port, test doubles drive an in-memory device. Everything above
//! it is written against the trait, so protocol code never knows which
//! one it has.

use crate::error::LinkError;

/// Line terminator used by [`DeviceLink::read_line`]
pub const DEFAULT_TERMINATOR: &[u8] = b"\r\n";

/// A byte-oriented channel to a receiver
///
/// Implementations are blocking. Reads observe a deadline and return
/// [`LinkError::Timeout`] when the device stays quiet; writes either
/// hand the full payload to the device or fail.
pub trait DeviceLink: Send {
    /// Open the channel. Fails if already open.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Close the channel. Safe to call on a link that never opened.
    fn close(&mut self);

    /// Whether the channel is currently open
    fn is_open(&self) -> bool;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Write a string verbatim, no terminator appended
    fn write_str(&mut self, text: &str) -> Result<(), LinkError>;

    /// Write a string followed by [`DEFAULT_TERMINATOR`]
    fn write_line(&mut self, text: &str) -> Result<(), LinkError>;

    /// Read until [`DEFAULT_TERMINATOR`], returning the line without it
    fn read_line(&mut self) -> Result<String, LinkError> {
        self.read_line_with_terminator(DEFAULT_TERMINATOR)
    }

    /// Read until `terminator`, returning the line without it
    ///
    /// Bytes that arrive after the terminator stay buffered for the next
    /// read.
    fn read_line_with_terminator(&mut self, terminator: &[u8]) -> Result<String, LinkError>;

    /// Read exactly `buf.len()` bytes
    ///
    /// A device that delivers fewer bytes within the deadline yields
    /// [`LinkError::Timeout`] and leaves the partial data buffered.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), LinkError>;
}
