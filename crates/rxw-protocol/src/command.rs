//! Receiver control command set
//!
//! The receiver family speaks single-byte opcodes over the serial link.
//! Most commands are a bare opcode; `EnablePower` carries one argument
//! byte. Replies, where a command produces one, are a single byte.
//!
//! # Exchange shapes
//! ```text
//! host -> radio:  [opcode]         notifications, toggles, queries
//! host -> radio:  [opcode] [arg]   EnablePower only
//! radio -> host:  [status]         query answers, toggle acknowledgments
//! ```
//!
//! Power changes are not acknowledged directly; the host confirms them by
//! polling `GetPower` / `GetRadioReady` until the reported state matches.
//! Mute and unmute produce no reply at all.

use crate::error::ProtocolError;

/// Receiver control opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Begin normal operation
    Run = 0x03,
    /// Prepare for startup
    Prepare = 0x06,
    /// Host-side initialisation complete
    Initialised = 0x07,
    /// Set power state (one argument byte: 0x01 on, 0x00 off)
    EnablePower = 0x08,
    /// Query power state
    GetPower = 0x0A,
    /// Query readiness after power-up
    GetRadioReady = 0x0D,
    /// Audio path unmuted
    Unmute = 0x50,
    /// Audio path muted
    Mute = 0x51,
    /// RF attenuator in
    EnableAttenuation = 0x56,
    /// RF attenuator out
    DisableAttenuation = 0x57,
    /// AGC on
    ///
    /// The AGC pair is not covered by the interface notes on hand; the
    /// codes follow the 0x5x toggle block next to the attenuator pair.
    EnableAgc = 0x58,
    /// AGC off
    DisableAgc = 0x59,
    /// Query current volume level
    GetVolume = 0x89,
}

impl Command {
    /// Wire value of this opcode
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the radio answers this command with a status byte
    pub fn expects_reply(self) -> bool {
        !matches!(
            self,
            Command::Run
                | Command::Prepare
                | Command::Initialised
                | Command::EnablePower
                | Command::Unmute
                | Command::Mute
        )
    }

    /// Whether this is a read-only query
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Command::GetPower | Command::GetRadioReady | Command::GetVolume
        )
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x03 => Ok(Self::Run),
            0x06 => Ok(Self::Prepare),
            0x07 => Ok(Self::Initialised),
            0x08 => Ok(Self::EnablePower),
            0x0A => Ok(Self::GetPower),
            0x0D => Ok(Self::GetRadioReady),
            0x50 => Ok(Self::Unmute),
            0x51 => Ok(Self::Mute),
            0x56 => Ok(Self::EnableAttenuation),
            0x57 => Ok(Self::DisableAttenuation),
            0x58 => Ok(Self::EnableAgc),
            0x59 => Ok(Self::DisableAgc),
            0x89 => Ok(Self::GetVolume),
            _ => Err(ProtocolError::UnknownCommand(value)),
        }
    }
}

/// Single-byte reply values
pub mod status {
    /// Query answered "off" / "not ready"
    pub const OFF: u8 = 0x00;
    /// Query answered "on" / "ready"
    pub const ON: u8 = 0x01;
    /// Toggle accepted
    pub const ACK: u8 = 0x06;
    /// Toggle rejected
    pub const NAK: u8 = 0x15;
}
