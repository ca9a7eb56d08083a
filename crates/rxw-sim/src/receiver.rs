//! Virtual receiver device model
//!
//! Implements the device side of the control protocol: single command
//! bytes in, single status bytes out. Commands that the real hardware
//! executes silently stay silent here too.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use rxw_protocol::{status, Command};

/// Initial state for a [`VirtualReceiver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualReceiverConfig {
    pub name: String,
    pub powered: bool,
    /// Ready polls the device answers OFF while warming up
    pub ready_delay: u32,
    pub volume: u8,
    pub muted: bool,
    /// Reject attenuation and AGC commands with NAK
    pub nak_toggles: bool,
}

impl Default for VirtualReceiverConfig {
    fn default() -> Self {
        VirtualReceiverConfig {
            name: "WR-3100e".to_string(),
            powered: true,
            ready_delay: 1,
            volume: 16,
            muted: false,
            nak_toggles: false,
        }
    }
}

/// A scripted receiver that speaks the wire protocol byte for byte
#[derive(Debug)]
pub struct VirtualReceiver {
    name: String,
    powered: bool,
    ready_countdown: u32,
    ready_delay: u32,
    muted: bool,
    attenuated: bool,
    agc: bool,
    volume: u8,
    nak_toggles: bool,
    awaiting_power_arg: bool,
    pending_output: VecDeque<u8>,
    received: Vec<u8>,
}

impl VirtualReceiver {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(VirtualReceiverConfig {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: VirtualReceiverConfig) -> Self {
        VirtualReceiver {
            name: config.name,
            powered: config.powered,
            // A freshly powered device is not instantly ready
            ready_countdown: config.ready_delay,
            ready_delay: config.ready_delay,
            muted: config.muted,
            attenuated: false,
            agc: false,
            volume: config.volume,
            nak_toggles: config.nak_toggles,
            awaiting_power_arg: false,
            pending_output: VecDeque::new(),
            received: Vec::new(),
        }
    }

    /// Feed one byte from the host
    pub fn push_byte(&mut self, byte: u8) {
        self.received.push(byte);

        if self.awaiting_power_arg {
            self.awaiting_power_arg = false;
            self.powered = byte != status::OFF;
            if self.powered {
                self.ready_countdown = self.ready_delay;
            }
            trace!("{}: power set to {}", self.name, self.powered);
            return;
        }

        let command = match Command::try_from(byte) {
            Ok(command) => command,
            Err(_) => {
                warn!("{}: ignoring unknown byte 0x{:02X}", self.name, byte);
                return;
            }
        };

        match command {
            Command::Run | Command::Prepare | Command::Initialised => {
                trace!("{}: {:?}", self.name, command);
            }
            Command::EnablePower => {
                self.awaiting_power_arg = true;
            }
            Command::GetPower => {
                self.reply(if self.powered { status::ON } else { status::OFF });
            }
            Command::GetRadioReady => {
                if self.powered && self.ready_countdown == 0 {
                    self.reply(status::ON);
                } else {
                    if self.powered && self.ready_countdown > 0 {
                        self.ready_countdown -= 1;
                    }
                    self.reply(status::OFF);
                }
            }
            Command::Mute => {
                self.muted = true;
            }
            Command::Unmute => {
                self.muted = false;
            }
            Command::EnableAttenuation => self.toggle(command, |device| device.attenuated = true),
            Command::DisableAttenuation => self.toggle(command, |device| device.attenuated = false),
            Command::EnableAgc => self.toggle(command, |device| device.agc = true),
            Command::DisableAgc => self.toggle(command, |device| device.agc = false),
            Command::GetVolume => {
                let volume = self.volume;
                self.reply(volume);
            }
        }
    }

    fn toggle(&mut self, command: Command, apply: impl FnOnce(&mut Self)) {
        if self.nak_toggles {
            trace!("{}: rejecting {:?}", self.name, command);
            self.reply(status::NAK);
        } else {
            apply(self);
            self.reply(status::ACK);
        }
    }

    fn reply(&mut self, byte: u8) {
        self.pending_output.push_back(byte);
    }

    /// Next byte the device wants to send, if any
    pub fn pop_output(&mut self) -> Option<u8> {
        self.pending_output.pop_front()
    }

    pub fn output_len(&self) -> usize {
        self.pending_output.len()
    }

    /// Every byte the host has sent, in order
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn attenuated(&self) -> bool {
        self.attenuated
    }

    pub fn agc(&self) -> bool {
        self.agc
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }

    pub fn set_nak_toggles(&mut self, nak_toggles: bool) {
        self.nak_toggles = nak_toggles;
    }
}
