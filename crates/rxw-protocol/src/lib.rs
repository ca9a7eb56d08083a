//! # rxw-protocol
//!
//! Control vocabulary and capability model for WiNRADiO-style serial
//! receivers.
//!
//! - [`command`]: the single-byte command set and reply status bytes
//! - [`caps`]: the self-sizing capability record and feature flags
//! - [`models`]: factory capability records for the supported revisions
//!
//! ## Example
//!
//! ```
//! use rxw_protocol::{Command, ProtocolError};
//!
//! assert_eq!(Command::Mute.code(), 0x51);
//! assert_eq!(Command::try_from(0x51)?, Command::Mute);
//! assert!(Command::try_from(0xFF).is_err());
//! # Ok::<(), ProtocolError>(())
//! ```

pub mod caps;
pub mod command;
pub mod error;
pub mod models;

pub use caps::{Demod, ExtendedInfo, FeatureFlags, HardwareVersion, InterfaceKind, ReceiverInfo};
pub use command::{status, Command};
pub use error::ProtocolError;
