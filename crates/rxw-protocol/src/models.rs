//! Factory capability records for the supported receiver models
//!
//! The serial protocol has no command for downloading the capability
//! record, so the driver installs one of these factory records when a
//! session starts. Field values follow the vendor data sheets.

use crate::caps::{Demod, ExtendedInfo, FeatureFlags, HardwareVersion, InterfaceKind, ReceiverInfo};

/// Capability record for a hardware revision
pub fn info_for(version: HardwareVersion) -> ReceiverInfo {
    use HardwareVersion as V;

    match version {
        V::Wr1000a | V::Wr1000b => record(
            version,
            FeatureFlags::default(),
            1_300_000_000,
            100,
            0,
            base_modes(),
            "Wideband communications receiver, 150 kHz to 1.3 GHz",
        ),
        V::Wr1500 | V::Wr1550 => record(
            version,
            FeatureFlags::LSB_USB,
            1_500_000_000,
            10,
            0,
            sideband_modes(),
            "Wideband communications receiver, 150 kHz to 1.5 GHz",
        ),
        V::Wr3000 | V::Wr3100 | V::Wr3150 => record(
            version,
            FeatureFlags::LSB_USB | FeatureFlags::AGC | FeatureFlags::IF_GAIN,
            1_600_000_000,
            10,
            2_000,
            sideband_modes(),
            "Professional monitoring receiver, 150 kHz to 1.6 GHz",
        ),
        V::Wr3200 => record(
            version,
            FeatureFlags::LSB_USB | FeatureFlags::AGC | FeatureFlags::IF_GAIN,
            2_000_000_000,
            10,
            2_000,
            sideband_modes(),
            "Professional monitoring receiver, 150 kHz to 2 GHz",
        ),
        V::Wr3500 => record(
            version,
            dsp_feature_set(),
            2_600_000_000,
            10,
            3_000,
            dsp_modes(),
            "Professional DSP receiver, 150 kHz to 2.6 GHz",
        ),
        V::Wr3700 => record(
            version,
            dsp_feature_set(),
            4_000_000_000,
            10,
            3_000,
            dsp_modes(),
            "Professional DSP receiver, 150 kHz to 4 GHz",
        ),
        V::Wr2000 => record(
            version,
            dsp_feature_set(),
            1_500_000_000,
            1,
            3_000,
            dsp_modes(),
            "Software-defined monitoring receiver, 150 kHz to 1.5 GHz",
        ),
    }
}

fn base_modes() -> Vec<Demod> {
    vec![Demod::Cw, Demod::Am, Demod::FmNarrow, Demod::FmWide]
}

fn sideband_modes() -> Vec<Demod> {
    vec![
        Demod::Cw,
        Demod::Am,
        Demod::FmNarrow,
        Demod::FmWide,
        Demod::Lsb,
        Demod::Usb,
    ]
}

fn dsp_modes() -> Vec<Demod> {
    vec![
        Demod::Cw,
        Demod::Am,
        Demod::FmNarrow,
        Demod::FmWide,
        Demod::Lsb,
        Demod::Usb,
        Demod::Fm50,
        Demod::Fm6,
    ]
}

fn dsp_feature_set() -> FeatureFlags {
    FeatureFlags::LSB_USB
        | FeatureFlags::AGC
        | FeatureFlags::IF_GAIN
        | FeatureFlags::DSP
        | FeatureFlags::CW_IF_SHIFT
}

fn record(
    version: HardwareVersion,
    features: FeatureFlags,
    max_frequency_hz: u32,
    frequency_resolution_hz: u32,
    max_if_shift_hz: u32,
    modes: Vec<Demod>,
    description: &str,
) -> ReceiverInfo {
    let tag = version.tag();
    ReceiverInfo {
        size: ReceiverInfo::WIRE_SIZE,
        features,
        api_version: tag >> 8,
        hardware_version: tag,
        min_frequency_hz: 150_000,
        max_frequency_hz,
        frequency_resolution_hz,
        num_modes: modes.len() as u32,
        max_volume: 31,
        max_bfo_hz: 3_000,
        max_fm_scan_rate: 50,
        max_am_scan_rate: 10,
        interface: InterfaceKind::Serial,
        device_number: 0,
        num_sources: 1,
        max_if_shift_hz,
        wave_formats: 0,
        dsp_sources: u32::from(features.contains(FeatureFlags::DSP)),
        modes,
        ext: ExtendedInfo {
            max_frequency_khz: max_frequency_hz / 1_000,
            device_name: format!("{}e", version.name()),
            max_if_gain: if features.contains(FeatureFlags::IF_GAIN) {
                100
            } else {
                0
            },
            description: description.to_string(),
        },
    }
}
