//! # rxw-sim
//!
//! Simulated receivers for exercising driver code without hardware.
//!
//! - [`VirtualReceiver`]: the device model, speaking the wire protocol
//! - [`SimLink`]: a `DeviceLink` wired to a virtual receiver, with
//!   failure injection and traffic inspection for tests

pub mod link;
pub mod receiver;

pub use link::SimLink;
pub use receiver::{VirtualReceiver, VirtualReceiverConfig};
