//! Live receiver state and the session registry
//!
//! A [`Settings`] record is the driver's view of one receiver: confirmed
//! hardware state alongside the caller's pending intent, plus the
//! capability snapshot installed when the session started. Records are
//! claimed from a [`SettingsRegistry`], which guarantees one session per
//! receiver at a time and keeps state across sessions.

use std::collections::{HashMap, HashSet};

use rxw_protocol::{Demod, ReceiverInfo};

/// Mutable state of one receiver
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Registry key and display name
    pub device_name: String,
    pub is_serial: bool,
    /// Whether a session currently holds this record
    pub in_use: bool,
    /// Frequency the hardware is tuned to, in Hz
    pub frequency_hz: u32,
    /// Frequency the caller asked for, in Hz
    pub wanted_frequency_hz: u32,
    pub if_crossover_hz: u32,
    pub frequency_error_hz: i32,
    /// Tuned frequency after calibration correction, in Hz
    pub actual_frequency_hz: u32,
    pub reference_frequency_hz: u32,
    pub power: bool,
    pub volume: u8,
    /// Volume level found at session start
    pub initial_volume: u8,
    pub mode: Demod,
    pub bfo_offset_hz: i32,
    pub attenuated: bool,
    /// Mute state the hardware last confirmed
    pub muted: bool,
    /// Mute state the caller wants
    pub wanted_mute: bool,
    /// Previous confirmed mute state
    pub last_muted: bool,
    pub agc: bool,
    pub if_shift_hz: i32,
    pub if_gain: u8,
    info: Option<ReceiverInfo>,
}

impl Settings {
    pub fn new(device_name: impl Into<String>) -> Self {
        Settings {
            device_name: device_name.into(),
            is_serial: true,
            in_use: false,
            frequency_hz: 0,
            wanted_frequency_hz: 0,
            if_crossover_hz: 0,
            frequency_error_hz: 0,
            actual_frequency_hz: 0,
            reference_frequency_hz: 0,
            power: false,
            volume: 0,
            initial_volume: 0,
            mode: Demod::Am,
            bfo_offset_hz: 0,
            attenuated: false,
            muted: false,
            wanted_mute: false,
            last_muted: false,
            agc: false,
            if_shift_hz: 0,
            if_gain: 0,
            info: None,
        }
    }

    /// Install the capability snapshot for this session
    pub fn set_receiver_info(&mut self, info: ReceiverInfo) {
        self.info = Some(info);
    }

    /// Capability snapshot, once a session has installed one
    ///
    /// Fields past the snapshot's declared size are gated by the
    /// accessors on [`ReceiverInfo`] itself.
    pub fn receiver_info(&self) -> Option<&ReceiverInfo> {
        self.info.as_ref()
    }
}

/// Hands out [`Settings`] records, one session per receiver
#[derive(Debug, Default)]
pub struct SettingsRegistry {
    parked: HashMap<String, Settings>,
    checked_out: HashSet<String>,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the settings record for a receiver
    ///
    /// Returns `None` while another session holds the record. A receiver
    /// seen for the first time gets a fresh record.
    pub fn settings_for_radio(&mut self, name: &str) -> Option<Settings> {
        if self.checked_out.contains(name) {
            return None;
        }
        self.checked_out.insert(name.to_string());
        let mut settings = self
            .parked
            .remove(name)
            .unwrap_or_else(|| Settings::new(name));
        settings.in_use = true;
        Some(settings)
    }

    /// Park a record claimed earlier, making the receiver claimable again
    pub fn release(&mut self, mut settings: Settings) {
        settings.in_use = false;
        self.checked_out.remove(&settings.device_name);
        self.parked.insert(settings.device_name.clone(), settings);
    }

    pub fn is_checked_out(&self, name: &str) -> bool {
        self.checked_out.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_settings_defaults() {
        let settings = Settings::new("WR-1550e");
        assert_eq!(settings.device_name, "WR-1550e");
        assert!(settings.is_serial);
        assert!(!settings.in_use);
        assert!(!settings.power);
        assert_eq!(settings.mode, Demod::Am);
        assert!(settings.receiver_info().is_none());
    }

    #[test]
    fn test_registry_enforces_exclusive_checkout() {
        let mut registry = SettingsRegistry::new();
        let settings = registry.settings_for_radio("WR-3100e").unwrap();
        assert!(settings.in_use);
        assert!(registry.is_checked_out("WR-3100e"));
        assert!(registry.settings_for_radio("WR-3100e").is_none());

        // A different receiver is unaffected
        assert!(registry.settings_for_radio("WR-1550e").is_some());
    }

    #[test]
    fn test_release_allows_recheckout() {
        let mut registry = SettingsRegistry::new();
        let settings = registry.settings_for_radio("WR-3100e").unwrap();
        registry.release(settings);
        assert!(!registry.is_checked_out("WR-3100e"));

        let settings = registry.settings_for_radio("WR-3100e").unwrap();
        assert!(settings.in_use);
    }

    #[test]
    fn test_state_survives_release() {
        let mut registry = SettingsRegistry::new();
        let mut settings = registry.settings_for_radio("WR-3100e").unwrap();
        settings.wanted_frequency_hz = 7_074_000;
        settings.volume = 12;
        registry.release(settings);

        let settings = registry.settings_for_radio("WR-3100e").unwrap();
        assert_eq!(settings.wanted_frequency_hz, 7_074_000);
        assert_eq!(settings.volume, 12);
    }
}
