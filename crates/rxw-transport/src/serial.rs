//! Serial port implementation of [`DeviceLink`]
//!
//! The port always runs raw: no flow control, no echo, parameters
//! reprogrammed as a complete set whenever any one of them changes.
//! Reads go through a [`LineFramer`] so callers see whole frames even
//! when the UART delivers fragments.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::LinkError;
use crate::framing::LineFramer;
use crate::link::{DeviceLink, DEFAULT_TERMINATOR};

/// Baud rates the receiver family's UARTs accept
pub const STANDARD_BAUD_RATES: &[u32] = &[
    300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400,
];

/// How long a break condition is held on the line
const BREAK_HOLD: Duration = Duration::from_millis(250);

/// Ports that are never receivers
const SKIP_PATTERNS: &[&str] = &["Bluetooth", "debug"];

/// Data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Stop bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Line parameters for a serial link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Deadline for a blocking read to produce what the caller asked for
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    /// Factory settings for the receiver family: 9600 8N1
    fn default() -> Self {
        SerialConfig {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Names of serial devices a receiver could be attached to
pub fn available_devices() -> Result<Vec<String>, LinkError> {
    let ports =
        serialport::available_ports().map_err(|e| LinkError::Enumeration(e.to_string()))?;
    let total = ports.len();
    let names: Vec<String> = ports
        .into_iter()
        .map(|info| info.port_name)
        .filter(|name| !SKIP_PATTERNS.iter().any(|pattern| name.contains(pattern)))
        .collect();
    info!(
        "Found {} serial devices ({} skipped)",
        names.len(),
        total - names.len()
    );
    Ok(names)
}

/// A [`DeviceLink`] over a local serial port
pub struct SerialLink {
    path: String,
    config: SerialConfig,
    port: Option<Box<dyn serialport::SerialPort>>,
    framer: LineFramer,
}

impl SerialLink {
    /// Link to `path` with [factory settings](SerialConfig::default)
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_config(path, SerialConfig::default())
    }

    pub fn with_config(path: impl Into<String>, config: SerialConfig) -> Self {
        SerialLink {
            path: path.into(),
            config,
            port: None,
            framer: LineFramer::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Change the baud rate, reprogramming an open port
    ///
    /// Rates outside [`STANDARD_BAUD_RATES`] are rejected before touching
    /// the port.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        if !STANDARD_BAUD_RATES.contains(&baud_rate) {
            return Err(LinkError::Config(format!(
                "non-standard baud rate: {baud_rate}"
            )));
        }
        self.config.baud_rate = baud_rate;
        self.reapply_config()
    }

    pub fn set_data_bits(&mut self, data_bits: DataBits) -> Result<(), LinkError> {
        self.config.data_bits = data_bits;
        self.reapply_config()
    }

    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> Result<(), LinkError> {
        self.config.stop_bits = stop_bits;
        self.reapply_config()
    }

    pub fn set_parity(&mut self, parity: Parity) -> Result<(), LinkError> {
        self.config.parity = parity;
        self.reapply_config()
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) -> Result<(), LinkError> {
        self.config.read_timeout = read_timeout;
        self.reapply_config()
    }

    /// Hold a break condition on the line for [`BREAK_HOLD`]
    pub fn send_break(&mut self) -> Result<(), LinkError> {
        let Some(port) = self.port.as_mut() else {
            return Err(LinkError::NotOpen);
        };
        debug!("Break on {} for {:?}", self.path, BREAK_HOLD);
        port.set_break().map_err(|e| LinkError::Io(e.into()))?;
        thread::sleep(BREAK_HOLD);
        port.clear_break().map_err(|e| LinkError::Io(e.into()))?;
        Ok(())
    }

    // The port is always programmed with the complete parameter set,
    // never one field at a time.
    fn reapply_config(&mut self) -> Result<(), LinkError> {
        let Some(port) = self.port.as_mut() else {
            return Ok(());
        };
        trace!("Reprogramming {}: {:?}", self.path, self.config);
        port.set_baud_rate(self.config.baud_rate)
            .map_err(|e| LinkError::Io(e.into()))?;
        port.set_data_bits(self.config.data_bits.into())
            .map_err(|e| LinkError::Io(e.into()))?;
        port.set_parity(self.config.parity.into())
            .map_err(|e| LinkError::Io(e.into()))?;
        port.set_stop_bits(self.config.stop_bits.into())
            .map_err(|e| LinkError::Io(e.into()))?;
        port.set_timeout(self.config.read_timeout)
            .map_err(|e| LinkError::Io(e.into()))?;
        Ok(())
    }

    fn write_all_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let Some(port) = self.port.as_mut() else {
            return Err(LinkError::NotOpen);
        };
        trace!("TX {}: {:02X?}", self.path, bytes);
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    /// One blocking read into the framer, honoring `deadline`
    ///
    /// The port timeout is shortened to the remaining budget so a read
    /// never overshoots the deadline; [`restore_timeout`](Self::restore_timeout)
    /// puts it back afterwards.
    fn fill_framer(&mut self, deadline: Instant) -> Result<(), LinkError> {
        let Some(port) = self.port.as_mut() else {
            return Err(LinkError::NotOpen);
        };
        let now = Instant::now();
        if now >= deadline {
            return Err(LinkError::Timeout(self.config.read_timeout));
        }
        let budget = deadline - now;
        if budget < self.config.read_timeout {
            if let Err(e) = port.set_timeout(budget) {
                warn!("Failed to shorten read timeout on {}: {}", self.path, e);
            }
        }
        let mut chunk = [0u8; 256];
        match port.read(&mut chunk) {
            Ok(0) => Err(LinkError::Timeout(self.config.read_timeout)),
            Ok(n) => {
                trace!("RX {}: {:02X?}", self.path, &chunk[..n]);
                self.framer.push_bytes(&chunk[..n]);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                Err(LinkError::Timeout(self.config.read_timeout))
            }
            Err(e) => Err(LinkError::Io(e)),
        }
    }

    fn restore_timeout(&mut self) {
        if let Some(port) = self.port.as_mut() {
            if let Err(e) = port.set_timeout(self.config.read_timeout) {
                warn!("Failed to restore read timeout on {}: {}", self.path, e);
            }
        }
    }
}

impl DeviceLink for SerialLink {
    fn open(&mut self) -> Result<(), LinkError> {
        if self.port.is_some() {
            return Err(LinkError::Open {
                port: self.path.clone(),
                reason: "already open".to_string(),
            });
        }
        if !STANDARD_BAUD_RATES.contains(&self.config.baud_rate) {
            return Err(LinkError::Config(format!(
                "non-standard baud rate: {}",
                self.config.baud_rate
            )));
        }
        let port = serialport::new(self.path.as_str(), self.config.baud_rate)
            .data_bits(self.config.data_bits.into())
            .stop_bits(self.config.stop_bits.into())
            .parity(self.config.parity.into())
            .flow_control(serialport::FlowControl::None)
            .timeout(self.config.read_timeout)
            .open()
            .map_err(|e| LinkError::Open {
                port: self.path.clone(),
                reason: e.to_string(),
            })?;
        self.port = Some(port);
        self.framer.clear();
        info!("Opened {} at {} baud", self.path, self.config.baud_rate);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Closed {}", self.path);
        }
        self.framer.clear();
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        self.write_all_bytes(&[byte])
    }

    fn write_str(&mut self, text: &str) -> Result<(), LinkError> {
        self.write_all_bytes(text.as_bytes())
    }

    fn write_line(&mut self, text: &str) -> Result<(), LinkError> {
        let mut payload = Vec::with_capacity(text.len() + DEFAULT_TERMINATOR.len());
        payload.extend_from_slice(text.as_bytes());
        payload.extend_from_slice(DEFAULT_TERMINATOR);
        self.write_all_bytes(&payload)
    }

    fn read_line_with_terminator(&mut self, terminator: &[u8]) -> Result<String, LinkError> {
        if terminator.is_empty() {
            return Err(LinkError::Config("empty line terminator".to_string()));
        }
        if self.port.is_none() {
            return Err(LinkError::NotOpen);
        }
        let deadline = Instant::now() + self.config.read_timeout;
        let result = loop {
            if let Some(line) = self.framer.take_line(terminator) {
                break Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if let Err(e) = self.fill_framer(deadline) {
                break Err(e);
            }
        };
        self.restore_timeout();
        result
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        if self.port.is_none() {
            return Err(LinkError::NotOpen);
        }
        let deadline = Instant::now() + self.config.read_timeout;
        let result = loop {
            if self.framer.pending_len() >= buf.len() {
                buf.copy_from_slice(&self.framer.take_exact(buf.len()));
                break Ok(());
            }
            if let Err(e) = self.fill_framer(deadline) {
                break Err(e);
            }
        };
        self.restore_timeout();
        result
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if self.port.is_some() {
            debug!("Dropping open link to {}", self.path);
        }
    }
}
