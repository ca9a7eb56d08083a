//! Integration tests for receiver sessions against the simulated device
//!
//! These tests drive a [`Radio`] over a [`SimLink`] and verify:
//! - The initialisation handshake and capability snapshot install
//! - Power transitions confirmed by bounded polling
//! - Fire-and-forget mute tracking
//! - ACK/NAK verdicts for attenuation and AGC
//! - That failed operations leave the settings record untouched

use std::time::Duration;

use rxw_driver::{ConfirmPolicy, Radio, RadioError, Settings, SettingsRegistry};
use rxw_protocol::{HardwareVersion, ReceiverInfo};
use rxw_sim::{SimLink, VirtualReceiver, VirtualReceiverConfig};
use rxw_transport::{DeviceLink, LinkError};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Confirmation policy that does not sleep between polls
    pub fn quick_policy() -> ConfirmPolicy {
        ConfirmPolicy {
            attempts: 4,
            poll_delay: Duration::ZERO,
        }
    }

    /// Radio over a simulated device, plus a probe handle on the link
    pub fn radio_with(config: VirtualReceiverConfig) -> (Radio, SimLink) {
        let link = SimLink::new(VirtualReceiver::from_config(config));
        let probe = link.clone();
        let radio = Radio::with_policy(Box::new(link), Settings::new("WR-3100e"), quick_policy());
        (radio, probe)
    }

    /// Radio that has already completed the session handshake
    pub fn initialised_radio() -> (Radio, SimLink) {
        let (mut radio, probe) = radio_with(VirtualReceiverConfig::default());
        radio.initialise(HardwareVersion::Wr3100).unwrap();
        (radio, probe)
    }

    /// Open the shared link through a probe clone, skipping the handshake
    pub fn open_link(probe: &SimLink) {
        let mut handle = probe.clone();
        handle.open().unwrap();
    }
}

// ============================================================================
// Initialisation Tests
// ============================================================================

mod initialisation_tests {
    use super::*;

    #[test]
    fn handshake_runs_in_protocol_order() {
        let (_radio, probe) = helpers::initialised_radio();

        // Prepare, Run, two ready polls (one boot cycle), Initialised,
        // then the volume query
        assert_eq!(probe.sent(), vec![0x06, 0x03, 0x0D, 0x0D, 0x07, 0x89]);
    }

    #[test]
    fn snapshot_installed_after_handshake() {
        let (radio, _probe) = helpers::initialised_radio();

        let info = radio.settings().receiver_info().unwrap();
        assert_eq!(info.size, ReceiverInfo::WIRE_SIZE);
        assert_eq!(info.device_name(), Some("WR-3100e"));
        assert!(radio.settings().power);
    }

    #[test]
    fn session_start_reads_hardware_volume() {
        let (mut radio, _probe) = helpers::radio_with(VirtualReceiverConfig {
            volume: 23,
            ..Default::default()
        });
        radio.initialise(HardwareVersion::Wr3100).unwrap();

        assert_eq!(radio.settings().volume, 23);
        assert_eq!(radio.settings().initial_volume, 23);
    }

    #[test]
    fn handshake_fails_when_device_never_ready() {
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig {
            powered: false,
            ..Default::default()
        });

        let err = radio.initialise(HardwareVersion::Wr3100).unwrap_err();
        assert!(matches!(err, RadioError::ConfirmTimeout { attempts: 4 }));
        assert_eq!(probe.count_sent(0x0D), 4);

        // Nothing committed
        assert!(radio.settings().receiver_info().is_none());
        assert!(!radio.settings().power);
    }
}

// ============================================================================
// Power Tests
// ============================================================================

mod power_tests {
    use super::*;

    #[test]
    fn power_on_confirmed_by_ready_poll() {
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig {
            powered: false,
            ready_delay: 1,
            ..Default::default()
        });
        helpers::open_link(&probe);

        radio.set_power(true).unwrap();

        assert!(radio.settings().power);
        assert!(probe.device_powered());
        // One poll while booting, one that confirms
        assert_eq!(probe.count_sent(0x0D), 2);
    }

    #[test]
    fn power_off_confirmed_by_power_poll() {
        let (mut radio, probe) = helpers::initialised_radio();

        radio.set_power(false).unwrap();

        assert!(!radio.settings().power);
        assert!(!probe.device_powered());
        assert_eq!(probe.count_sent(0x0A), 1);
    }

    #[test]
    fn unconfirmed_power_change_is_not_committed() {
        // Device that never finishes booting
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig {
            powered: false,
            ready_delay: u32::MAX,
            ..Default::default()
        });
        helpers::open_link(&probe);

        let err = radio.set_power(true).unwrap_err();

        assert!(matches!(err, RadioError::ConfirmTimeout { attempts: 4 }));
        assert_eq!(probe.count_sent(0x0D), 4);
        assert!(!radio.settings().power);
    }

    #[test]
    fn confirmed_state_is_never_resent() {
        let (mut radio, probe) = helpers::initialised_radio();
        let writes_before = probe.writes();

        radio.set_power(true).unwrap();

        assert_eq!(probe.writes(), writes_before);
    }
}

// ============================================================================
// Mute Tests
// ============================================================================

mod mute_tests {
    use super::*;

    #[test]
    fn mute_sent_once_and_committed_on_write() {
        let (mut radio, probe) = helpers::initialised_radio();

        radio.settings_mut().wanted_mute = true;
        radio.update_mute().unwrap();

        assert_eq!(probe.count_sent(0x51), 1);
        assert!(radio.settings().muted);
        assert!(!radio.settings().last_muted);
        assert!(probe.device_muted());
    }

    #[test]
    fn satisfied_intent_sends_nothing() {
        let (mut radio, probe) = helpers::initialised_radio();

        radio.settings_mut().wanted_mute = true;
        radio.update_mute().unwrap();
        radio.update_mute().unwrap();

        assert_eq!(probe.count_sent(0x51), 1);
    }

    #[test]
    fn unmute_tracks_previous_state() {
        let (mut radio, probe) = helpers::initialised_radio();

        radio.settings_mut().wanted_mute = true;
        radio.update_mute().unwrap();
        radio.settings_mut().wanted_mute = false;
        radio.update_mute().unwrap();

        assert_eq!(probe.count_sent(0x50), 1);
        assert!(!radio.settings().muted);
        assert!(radio.settings().last_muted);
        assert!(!probe.device_muted());
    }

    #[test]
    fn rejected_mute_write_commits_nothing() {
        let (mut radio, probe) = helpers::initialised_radio();
        probe.set_fail_writes(true);

        radio.settings_mut().wanted_mute = true;
        let err = radio.update_mute().unwrap_err();

        assert!(matches!(err, RadioError::Link(_)));
        assert!(!radio.settings().muted);
        assert!(!radio.settings().last_muted);
    }
}

// ============================================================================
// Attenuation and AGC Tests
// ============================================================================

mod toggle_tests {
    use super::*;

    #[test]
    fn attenuation_committed_on_ack() {
        let (mut radio, probe) = helpers::initialised_radio();

        radio.set_attenuation(true).unwrap();

        assert_eq!(probe.count_sent(0x56), 1);
        assert!(radio.settings().attenuated);
        assert!(probe.device_attenuated());
    }

    #[test]
    fn attenuation_nak_leaves_record() {
        let (mut radio, probe) = helpers::initialised_radio();
        probe.set_nak_toggles(true);

        let err = radio.set_attenuation(true).unwrap_err();

        assert!(matches!(err, RadioError::Nack { code: 0x56 }));
        assert!(!radio.settings().attenuated);
        assert!(!probe.device_attenuated());
    }

    #[test]
    fn attenuation_noop_skips_the_wire() {
        let (mut radio, probe) = helpers::initialised_radio();
        let writes_before = probe.writes();

        radio.set_attenuation(false).unwrap();

        assert_eq!(probe.writes(), writes_before);
    }

    #[test]
    fn agc_needs_a_capability_snapshot() {
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig::default());

        let err = radio.set_agc(true).unwrap_err();

        assert!(matches!(err, RadioError::Unsupported(_)));
        assert_eq!(probe.writes(), 0);
    }

    #[test]
    fn agc_rejected_on_receivers_without_it() {
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig::default());
        radio.initialise(HardwareVersion::Wr1550).unwrap();

        let err = radio.set_agc(true).unwrap_err();

        assert!(matches!(err, RadioError::Unsupported(_)));
        assert_eq!(probe.count_sent(0x58), 0);
    }

    #[test]
    fn agc_toggles_on_capable_receivers() {
        let (mut radio, probe) = helpers::radio_with(VirtualReceiverConfig::default());
        radio.initialise(HardwareVersion::Wr3700).unwrap();

        radio.set_agc(true).unwrap();
        assert!(radio.settings().agc);
        assert!(probe.device_agc());

        radio.set_agc(false).unwrap();
        assert!(!radio.settings().agc);
        assert_eq!(probe.count_sent(0x58), 1);
        assert_eq!(probe.count_sent(0x59), 1);
    }
}

// ============================================================================
// Failure Injection Tests
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn failed_writes_leave_settings_untouched() {
        let (mut radio, probe) = helpers::initialised_radio();
        let before = radio.settings().clone();
        probe.set_fail_writes(true);

        assert!(radio.set_power(false).is_err());
        assert!(radio.set_attenuation(true).is_err());
        assert!(radio.set_agc(true).is_err());
        assert!(radio.refresh_volume().is_err());

        assert_eq!(radio.settings(), &before);
    }

    #[test]
    fn failed_reads_leave_settings_untouched() {
        let (mut radio, probe) = helpers::initialised_radio();
        let before = radio.settings().clone();
        probe.set_fail_reads(true);

        assert!(radio.set_power(false).is_err());
        assert!(radio.set_attenuation(true).is_err());
        assert!(radio.refresh_volume().is_err());

        assert_eq!(radio.settings(), &before);
    }

    #[test]
    fn operations_need_an_open_link() {
        let link = SimLink::new(VirtualReceiver::new("closed"));
        let mut radio = Radio::with_policy(
            Box::new(link),
            Settings::new("closed"),
            helpers::quick_policy(),
        );

        let err = radio.set_power(true).unwrap_err();
        assert!(matches!(err, RadioError::Link(LinkError::NotOpen)));
        assert!(!radio.settings().power);
    }
}

// ============================================================================
// Volume Tests
// ============================================================================

mod volume_tests {
    use super::*;

    #[test]
    fn refresh_reads_hardware_level() {
        let (mut radio, probe) = helpers::initialised_radio();
        probe.set_device_volume(7);

        assert_eq!(radio.refresh_volume().unwrap(), 7);
        assert_eq!(radio.settings().volume, 7);
    }
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn registry_roundtrip_preserves_session_state() {
        let mut registry = SettingsRegistry::new();
        let settings = registry.settings_for_radio("WR-3100e").unwrap();

        let link = SimLink::new(VirtualReceiver::new("WR-3100e"));
        let mut radio = Radio::with_policy(Box::new(link), settings, helpers::quick_policy());
        radio.initialise(HardwareVersion::Wr3100).unwrap();
        radio.settings_mut().wanted_mute = true;
        radio.update_mute().unwrap();

        registry.release(radio.into_settings());

        let settings = registry.settings_for_radio("WR-3100e").unwrap();
        assert!(settings.muted);
        assert!(settings.power);
        assert!(settings.receiver_info().is_some());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn power_confirmation_is_bounded(
            attempts in 1u32..8,
            ready_delay in 0u32..8,
        ) {
            let link = SimLink::new(VirtualReceiver::from_config(VirtualReceiverConfig {
                powered: false,
                ready_delay,
                ..Default::default()
            }));
            let probe = link.clone();
            let policy = ConfirmPolicy { attempts, poll_delay: Duration::ZERO };
            let mut radio = Radio::with_policy(Box::new(link), Settings::new("sim"), policy);
            helpers::open_link(&probe);

            let result = radio.set_power(true);

            if ready_delay + 1 <= attempts {
                prop_assert!(result.is_ok());
                prop_assert!(radio.settings().power);
                prop_assert_eq!(probe.count_sent(0x0D) as u32, ready_delay + 1);
            } else {
                prop_assert!(result.is_err());
                prop_assert!(!radio.settings().power);
                prop_assert_eq!(probe.count_sent(0x0D) as u32, attempts);
            }
        }

        #[test]
        fn mute_state_follows_any_intent_sequence(
            intents in proptest::collection::vec(any::<bool>(), 1..20),
        ) {
            let (mut radio, probe) = helpers::initialised_radio();

            let mut confirmed = false;
            let mut expected_commands = 0usize;
            for &intent in &intents {
                radio.settings_mut().wanted_mute = intent;
                radio.update_mute().unwrap();

                prop_assert_eq!(radio.settings().muted, intent);
                prop_assert_eq!(probe.device_muted(), intent);
                if intent != confirmed {
                    expected_commands += 1;
                    confirmed = intent;
                }
            }

            let sent = probe.count_sent(0x51) + probe.count_sent(0x50);
            prop_assert_eq!(sent, expected_commands);
        }

        #[test]
        fn volume_refresh_reports_any_level(level in any::<u8>()) {
            let (mut radio, probe) = helpers::initialised_radio();
            probe.set_device_volume(level);

            prop_assert_eq!(radio.refresh_volume().unwrap(), level);
            prop_assert_eq!(radio.settings().volume, level);
        }
    }
}
