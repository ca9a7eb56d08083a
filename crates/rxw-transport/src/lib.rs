//! # rxw-transport
//!
//! Byte-oriented device links for rxwire receivers.
//!
//! - [`link`]: the [`DeviceLink`] trait every transport implements
//! - [`serial`]: the production serial port link and its configuration
//! - [`framing`]: line reassembly over fragmented reads
//!
//! Protocol code takes a `Box<dyn DeviceLink>` and never learns whether
//! it is talking to real hardware or a test double.

pub mod error;
pub mod framing;
pub mod link;
pub mod serial;

pub use error::LinkError;
pub use framing::LineFramer;
pub use link::{DeviceLink, DEFAULT_TERMINATOR};
pub use serial::{
    available_devices, DataBits, Parity, SerialConfig, SerialLink, StopBits, STANDARD_BAUD_RATES,
};
