//! Receiver capability model
//!
//! A receiver is described by a self-sizing capability record: the leading
//! `size` field declares how many bytes of the record the firmware
//! actually filled in. Older firmware fills fewer bytes, newer firmware
//! more, and both sides stay compatible as long as consumers never trust
//! a field the declared size does not cover. [`ReceiverInfo`] keeps the
//! trailing, revision-dependent fields behind checked accessors for that
//! reason.

use crate::error::ProtocolError;

/// Receiver feature bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureFlags(pub u32);

impl FeatureFlags {
    /// US frequency plan firmware
    pub const US_VERSION: FeatureFlags = FeatureFlags(0x0000_0001);
    /// DSP unit fitted
    pub const DSP: FeatureFlags = FeatureFlags(0x0000_0002);
    /// LSB/USB demodulators fitted
    pub const LSB_USB: FeatureFlags = FeatureFlags(0x0000_0004);
    /// IF shift usable in CW mode
    pub const CW_IF_SHIFT: FeatureFlags = FeatureFlags(0x0000_0008);
    /// Switchable AGC
    pub const AGC: FeatureFlags = FeatureFlags(0x0000_0100);
    /// Adjustable IF gain
    pub const IF_GAIN: FeatureFlags = FeatureFlags(0x0000_0200);

    /// Whether every bit of `other` is set in `self`
    pub fn contains(self, other: FeatureFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit value
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for FeatureFlags {
    type Output = FeatureFlags;

    fn bitor(self, rhs: FeatureFlags) -> FeatureFlags {
        FeatureFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for FeatureFlags {
    fn bitor_assign(&mut self, rhs: FeatureFlags) {
        self.0 |= rhs.0;
    }
}

/// Hardware revision tags reported by the receiver family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HardwareVersion {
    /// Original WR-1000 board
    Wr1000a = 0x0100,
    /// Revised WR-1000 board
    Wr1000b = 0x010A,
    Wr1500 = 0x0132,
    Wr1550 = 0x0137,
    Wr3000 = 0x0200,
    Wr3100 = 0x020A,
    Wr3150 = 0x020F,
    Wr3200 = 0x0214,
    Wr3500 = 0x0232,
    Wr3700 = 0x0246,
    Wr2000 = 0x0300,
}

impl HardwareVersion {
    /// Wire value of this revision tag
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Look up a revision by its wire tag
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0x0100 => Some(Self::Wr1000a),
            0x010A => Some(Self::Wr1000b),
            0x0132 => Some(Self::Wr1500),
            0x0137 => Some(Self::Wr1550),
            0x0200 => Some(Self::Wr3000),
            0x020A => Some(Self::Wr3100),
            0x020F => Some(Self::Wr3150),
            0x0214 => Some(Self::Wr3200),
            0x0232 => Some(Self::Wr3500),
            0x0246 => Some(Self::Wr3700),
            0x0300 => Some(Self::Wr2000),
            _ => None,
        }
    }

    /// Marketing name of this revision
    ///
    /// The two WR-1000 board revisions share a name; tell them apart by
    /// [`tag`](Self::tag).
    pub fn name(self) -> &'static str {
        match self {
            Self::Wr1000a => "WR-1000",
            Self::Wr1000b => "WR-1000",
            Self::Wr1500 => "WR-1500",
            Self::Wr1550 => "WR-1550",
            Self::Wr3000 => "WR-3000",
            Self::Wr3100 => "WR-3100",
            Self::Wr3150 => "WR-3150",
            Self::Wr3200 => "WR-3200",
            Self::Wr3500 => "WR-3500",
            Self::Wr3700 => "WR-3700",
            Self::Wr2000 => "WR-2000",
        }
    }
}

/// Demodulation modes, numbered the way the hardware numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Demod {
    Cw = 0,
    Am = 1,
    /// Narrow FM (15 kHz)
    FmNarrow = 2,
    /// Wide FM (broadcast)
    FmWide = 3,
    Lsb = 4,
    Usb = 5,
    /// 50 kHz FM
    Fm50 = 6,
    /// 6 kHz narrow FM
    Fm6 = 7,
}

impl Demod {
    /// Wire value of this mode
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Single-sideband mode
    pub fn is_sideband(self) -> bool {
        matches!(self, Demod::Lsb | Demod::Usb)
    }

    /// Any of the FM variants
    pub fn is_fm(self) -> bool {
        matches!(
            self,
            Demod::FmNarrow | Demod::FmWide | Demod::Fm50 | Demod::Fm6
        )
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Demod::Cw => "CW",
            Demod::Am => "AM",
            Demod::FmNarrow => "FMN",
            Demod::FmWide => "FMW",
            Demod::Lsb => "LSB",
            Demod::Usb => "USB",
            Demod::Fm50 => "FM50",
            Demod::Fm6 => "FM6",
        }
    }
}

impl TryFrom<u8> for Demod {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cw),
            1 => Ok(Self::Am),
            2 => Ok(Self::FmNarrow),
            3 => Ok(Self::FmWide),
            4 => Ok(Self::Lsb),
            5 => Ok(Self::Usb),
            6 => Ok(Self::Fm50),
            7 => Ok(Self::Fm6),
            _ => Err(ProtocolError::UnknownMode(value)),
        }
    }
}

/// How the receiver attaches to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterfaceKind {
    /// Legacy bus card
    Isa = 0,
    /// Serial link
    Serial = 1,
}

impl TryFrom<u8> for InterfaceKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Isa),
            1 => Ok(Self::Serial),
            _ => Err(ProtocolError::UnknownInterface(value)),
        }
    }
}

/// Fields added by later capability record revisions
///
/// Raw values here are meaningful only when the record's declared size
/// covers them; read them through the checked accessors on
/// [`ReceiverInfo`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedInfo {
    /// Upper frequency bound in kHz (for ranges past the Hz field's reach)
    pub max_frequency_khz: u32,
    /// Factory device name
    pub device_name: String,
    /// Highest IF gain setting
    pub max_if_gain: u32,
    /// Free-form hardware description
    pub description: String,
}

/// Self-sizing receiver capability record
///
/// Populated once per session. The layout constants follow the vendor's
/// 32-bit record; `size` is the byte count the firmware declares filled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiverInfo {
    /// Declared record size in bytes
    pub size: u32,
    /// Feature bits
    pub features: FeatureFlags,
    /// Control API revision
    pub api_version: u16,
    /// Hardware revision tag (see [`HardwareVersion`])
    pub hardware_version: u16,
    /// Lowest tunable frequency in Hz
    pub min_frequency_hz: u32,
    /// Highest tunable frequency in Hz
    pub max_frequency_hz: u32,
    /// Tuning resolution in Hz
    pub frequency_resolution_hz: u32,
    /// Number of demodulators fitted
    pub num_modes: u32,
    /// Highest volume level
    pub max_volume: u32,
    /// BFO adjustment range in Hz
    pub max_bfo_hz: u32,
    /// Fastest FM-mode scan rate, steps per second
    pub max_fm_scan_rate: u32,
    /// Fastest AM-mode scan rate, steps per second
    pub max_am_scan_rate: u32,
    /// Host attachment
    pub interface: InterfaceKind,
    /// Device index on the host
    pub device_number: u32,
    /// Number of signal sources
    pub num_sources: u32,
    /// IF shift range in Hz
    pub max_if_shift_hz: u32,
    /// Supported waveform format bits
    pub wave_formats: u32,
    /// Number of DSP source channels
    pub dsp_sources: u32,
    /// Supported demodulation modes in hardware order
    pub modes: Vec<Demod>,
    /// Revision-dependent trailing fields
    pub ext: ExtendedInfo,
}

impl ReceiverInfo {
    /// Size of the complete record revision this library understands
    pub const WIRE_SIZE: u32 = 224;

    /// Byte offsets of the fields later record revisions added
    pub const OFFSET_MAX_FREQ_KHZ: u32 = 72;
    pub const OFFSET_DEVICE_NAME: u32 = 76;
    pub const OFFSET_MAX_IF_GAIN: u32 = 140;
    pub const OFFSET_DESCRIPTION: u32 = 144;

    const DEVICE_NAME_LEN: u32 = 64;
    const DESCRIPTION_LEN: u32 = 80;

    /// Whether the declared size covers bytes `..end`
    pub fn covers(&self, end: u32) -> bool {
        self.size >= end
    }

    /// Upper frequency bound in kHz, on revisions that report one
    pub fn max_frequency_khz(&self) -> Option<u32> {
        self.covers(Self::OFFSET_MAX_FREQ_KHZ + 4)
            .then_some(self.ext.max_frequency_khz)
    }

    /// Factory device name, on revisions that report one
    pub fn device_name(&self) -> Option<&str> {
        self.covers(Self::OFFSET_DEVICE_NAME + Self::DEVICE_NAME_LEN)
            .then_some(self.ext.device_name.as_str())
    }

    /// Highest IF gain setting, on revisions that report one
    pub fn max_if_gain(&self) -> Option<u32> {
        self.covers(Self::OFFSET_MAX_IF_GAIN + 4)
            .then_some(self.ext.max_if_gain)
    }

    /// Hardware description, on revisions that report one
    pub fn description(&self) -> Option<&str> {
        self.covers(Self::OFFSET_DESCRIPTION + Self::DESCRIPTION_LEN)
            .then_some(self.ext.description.as_str())
    }

    /// Whether the receiver advertises a feature
    pub fn has_feature(&self, flag: FeatureFlags) -> bool {
        self.features.contains(flag)
    }

    /// Whether the receiver fits a demodulator for `mode`
    pub fn supports_mode(&self, mode: Demod) -> bool {
        self.modes.contains(&mode)
    }

    /// Hardware revision, when the tag is a known one
    pub fn hardware_revision(&self) -> Option<HardwareVersion> {
        HardwareVersion::from_tag(self.hardware_version)
    }
}
