//! Receiver control operations
//!
//! Every operation follows the same shape: send the command and confirm
//! it took effect before committing the new state to the settings
//! record. Confirmation is either the device's direct answer (ACK/NAK
//! toggles, queries) or a bounded status poll (power transitions).
//! Commands the hardware executes silently commit when the transport
//! accepts the write.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use rxw_protocol::{status, Command, FeatureFlags, HardwareVersion};
use rxw_transport::DeviceLink;

use crate::error::RadioError;
use crate::settings::Settings;

/// How persistently a status poll waits for confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPolicy {
    /// Number of polls before giving up
    pub attempts: u32,
    /// Pause between polls
    pub poll_delay: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        ConfirmPolicy {
            attempts: 10,
            poll_delay: Duration::from_millis(50),
        }
    }
}

/// One receiver session over an exclusively owned link
///
/// Operations block until the hardware confirms the change or the
/// attempt fails (device refusal or link error). A failed operation
/// leaves the settings record exactly as it was.
pub struct Radio {
    link: Box<dyn DeviceLink>,
    settings: Settings,
    confirm: ConfirmPolicy,
}

impl Radio {
    pub fn new(link: Box<dyn DeviceLink>, settings: Settings) -> Self {
        Self::with_policy(link, settings, ConfirmPolicy::default())
    }

    pub fn with_policy(
        link: Box<dyn DeviceLink>,
        settings: Settings,
        confirm: ConfirmPolicy,
    ) -> Self {
        Radio {
            link,
            settings,
            confirm,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// End the session, closing the link and yielding the record for
    /// [`SettingsRegistry::release`](crate::SettingsRegistry::release)
    pub fn into_settings(mut self) -> Settings {
        self.link.close();
        self.settings
    }

    pub fn close(&mut self) {
        self.link.close();
    }

    /// Bring the receiver up and install its capability snapshot
    ///
    /// Opens the link if needed and runs the power-up handshake. Once
    /// the hardware reports ready the current volume is read back. The
    /// settings record is only touched after every exchange succeeded.
    pub fn initialise(&mut self, model: HardwareVersion) -> Result<(), RadioError> {
        let info = rxw_protocol::models::info_for(model);
        if !self.link.is_open() {
            self.link.open()?;
        }
        info!(
            "Initialising {} as {}",
            self.settings.device_name,
            model.name()
        );
        self.link.write_byte(Command::Prepare.code())?;
        self.link.write_byte(Command::Run.code())?;
        self.poll_status(Command::GetRadioReady, status::ON)?;
        self.link.write_byte(Command::Initialised.code())?;
        let volume = self.exchange_status(Command::GetVolume)?;

        self.settings.set_receiver_info(info);
        self.settings.power = true;
        self.settings.volume = volume;
        self.settings.initial_volume = volume;
        Ok(())
    }

    /// Switch main power, confirmed by polling
    ///
    /// Powering on is confirmed by the ready poll, powering off by the
    /// power poll.
    pub fn set_power(&mut self, on: bool) -> Result<(), RadioError> {
        if self.settings.power == on {
            trace!("{}: power already {}", self.settings.device_name, on);
            return Ok(());
        }
        self.link.write_byte(Command::EnablePower.code())?;
        self.link
            .write_byte(if on { status::ON } else { status::OFF })?;
        if on {
            self.poll_status(Command::GetRadioReady, status::ON)?;
        } else {
            self.poll_status(Command::GetPower, status::OFF)?;
        }
        self.settings.power = on;
        Ok(())
    }

    /// Drive the hardware mute toward the wanted state
    ///
    /// Mute commands are fire-and-forget on the wire, so the record
    /// commits as soon as the transport accepts the byte.
    pub fn update_mute(&mut self) -> Result<(), RadioError> {
        let wanted = self.settings.wanted_mute;
        if wanted == self.settings.muted {
            return Ok(());
        }
        let command = if wanted { Command::Mute } else { Command::Unmute };
        self.link.write_byte(command.code())?;
        self.settings.last_muted = self.settings.muted;
        self.settings.muted = wanted;
        Ok(())
    }

    /// Switch the input attenuator, waiting for the device's verdict
    pub fn set_attenuation(&mut self, on: bool) -> Result<(), RadioError> {
        if self.settings.attenuated == on {
            return Ok(());
        }
        let command = if on {
            Command::EnableAttenuation
        } else {
            Command::DisableAttenuation
        };
        self.exchange_ack(command)?;
        self.settings.attenuated = on;
        Ok(())
    }

    /// Switch automatic gain control, on receivers that have it
    pub fn set_agc(&mut self, on: bool) -> Result<(), RadioError> {
        let supported = self
            .settings
            .receiver_info()
            .is_some_and(|info| info.has_feature(FeatureFlags::AGC));
        if !supported {
            return Err(RadioError::Unsupported("switchable AGC"));
        }
        if self.settings.agc == on {
            return Ok(());
        }
        let command = if on {
            Command::EnableAgc
        } else {
            Command::DisableAgc
        };
        self.exchange_ack(command)?;
        self.settings.agc = on;
        Ok(())
    }

    /// Read the hardware volume into the settings record
    pub fn refresh_volume(&mut self) -> Result<u8, RadioError> {
        let volume = self.exchange_status(Command::GetVolume)?;
        self.settings.volume = volume;
        Ok(volume)
    }

    /// Poll `query` until it answers `expected`
    ///
    /// Makes exactly `attempts` tries, pausing from the second try on.
    fn poll_status(&mut self, query: Command, expected: u8) -> Result<(), RadioError> {
        for attempt in 0..self.confirm.attempts {
            if attempt > 0 {
                thread::sleep(self.confirm.poll_delay);
            }
            let answer = self.exchange_status(query)?;
            if answer == expected {
                trace!("{:?} confirmed after {} polls", query, attempt + 1);
                return Ok(());
            }
        }
        warn!(
            "{:?} never answered 0x{:02X} in {} polls",
            query, expected, self.confirm.attempts
        );
        Err(RadioError::ConfirmTimeout {
            attempts: self.confirm.attempts,
        })
    }

    /// Write one command byte and read its one-byte answer
    ///
    /// All query traffic funnels through here, and the answer is
    /// consumed before the next command goes out, so a single request is
    /// outstanding at any time.
    fn exchange_status(&mut self, query: Command) -> Result<u8, RadioError> {
        self.link.write_byte(query.code())?;
        let mut reply = [0u8; 1];
        self.link.read_exact(&mut reply)?;
        Ok(reply[0])
    }

    fn exchange_ack(&mut self, command: Command) -> Result<(), RadioError> {
        match self.exchange_status(command)? {
            status::ACK => Ok(()),
            status::NAK => Err(RadioError::Nack {
                code: command.code(),
            }),
            other => Err(rxw_protocol::ProtocolError::BadStatus(other).into()),
        }
    }
}
