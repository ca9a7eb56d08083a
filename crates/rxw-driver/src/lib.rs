//! # rxw-driver
//!
//! Session management and control operations for WiNRADiO-style serial
//! receivers.
//!
//! ## Architecture
//!
//! - [`Radio`]: one session over an exclusively owned device link,
//!   running the command/confirm/commit cycle for every operation
//! - [`Settings`]: the live state record for one receiver, plus its
//!   capability snapshot
//! - [`SettingsRegistry`]: hands out records, one session per receiver,
//!   keeping state across sessions
//!
//! ## Example
//!
//! ```
//! use rxw_driver::SettingsRegistry;
//!
//! let mut registry = SettingsRegistry::new();
//! let settings = registry.settings_for_radio("WR-3100e").unwrap();
//!
//! // The record is exclusive until released
//! assert!(registry.settings_for_radio("WR-3100e").is_none());
//!
//! registry.release(settings);
//! assert!(registry.settings_for_radio("WR-3100e").is_some());
//! ```

pub mod error;
pub mod radio;
pub mod settings;

pub use error::RadioError;
pub use radio::{ConfirmPolicy, Radio};
pub use settings::{Settings, SettingsRegistry};
