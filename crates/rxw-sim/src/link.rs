//! In-memory [`DeviceLink`] backed by a [`VirtualReceiver`]
//!
//! Shares its state behind an `Arc`, so cloning before handing the link
//! to driver code leaves the test with a probe handle: the clone sees
//! every byte written and can reach into the device model while the
//! driver owns the link.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rxw_transport::{DeviceLink, LineFramer, LinkError, DEFAULT_TERMINATOR};

use crate::receiver::VirtualReceiver;

/// Timeout reported when the simulated device has nothing to say
const SIM_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct SimState {
    receiver: VirtualReceiver,
    open: bool,
    fail_opens: bool,
    fail_writes: bool,
    fail_reads: bool,
    inbound: LineFramer,
    sent: Vec<u8>,
    writes: usize,
}

impl SimState {
    fn drain_device_output(&mut self) {
        while let Some(byte) = self.receiver.pop_output() {
            self.inbound.push_bytes(&[byte]);
        }
    }
}

/// A [`DeviceLink`] that talks to a [`VirtualReceiver`]
#[derive(Debug, Clone)]
pub struct SimLink {
    inner: Arc<Mutex<SimState>>,
}

impl SimLink {
    pub fn new(receiver: VirtualReceiver) -> Self {
        SimLink {
            inner: Arc::new(Mutex::new(SimState {
                receiver,
                open: false,
                fail_opens: false,
                fail_writes: false,
                fail_reads: false,
                inbound: LineFramer::new(),
                sent: Vec::new(),
                writes: 0,
            })),
        }
    }

    // Keep the state usable even if a test panicked while holding the lock
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue bytes as if the device had sent them
    pub fn inject_bytes(&self, bytes: &[u8]) {
        self.state().inbound.push_bytes(bytes);
    }

    pub fn set_fail_opens(&self, fail: bool) {
        self.state().fail_opens = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Every byte written to the link, in order
    pub fn sent(&self) -> Vec<u8> {
        self.state().sent.clone()
    }

    /// Number of write calls made on the link
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// How many times `byte` has been written
    pub fn count_sent(&self, byte: u8) -> usize {
        self.state().sent.iter().filter(|&&b| b == byte).count()
    }

    pub fn device_powered(&self) -> bool {
        self.state().receiver.powered()
    }

    pub fn device_muted(&self) -> bool {
        self.state().receiver.muted()
    }

    pub fn device_attenuated(&self) -> bool {
        self.state().receiver.attenuated()
    }

    pub fn device_agc(&self) -> bool {
        self.state().receiver.agc()
    }

    pub fn device_volume(&self) -> u8 {
        self.state().receiver.volume()
    }

    pub fn set_device_volume(&self, volume: u8) {
        self.state().receiver.set_volume(volume);
    }

    pub fn set_nak_toggles(&self, nak_toggles: bool) {
        self.state().receiver.set_nak_toggles(nak_toggles);
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut state = self.state();
        if !state.open {
            return Err(LinkError::NotOpen);
        }
        if state.fail_writes {
            return Err(LinkError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        state.writes += 1;
        for &byte in bytes {
            state.sent.push(byte);
            state.receiver.push_byte(byte);
        }
        Ok(())
    }
}

impl DeviceLink for SimLink {
    fn open(&mut self) -> Result<(), LinkError> {
        let mut state = self.state();
        if state.fail_opens {
            return Err(LinkError::Open {
                port: "sim".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        if state.open {
            return Err(LinkError::Open {
                port: "sim".to_string(),
                reason: "already open".to_string(),
            });
        }
        state.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state().open = false;
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        self.write_bytes(&[byte])
    }

    fn write_str(&mut self, text: &str) -> Result<(), LinkError> {
        self.write_bytes(text.as_bytes())
    }

    fn write_line(&mut self, text: &str) -> Result<(), LinkError> {
        let mut payload = text.as_bytes().to_vec();
        payload.extend_from_slice(DEFAULT_TERMINATOR);
        self.write_bytes(&payload)
    }

    fn read_line_with_terminator(&mut self, terminator: &[u8]) -> Result<String, LinkError> {
        if terminator.is_empty() {
            return Err(LinkError::Config("empty line terminator".to_string()));
        }
        let mut state = self.state();
        if !state.open {
            return Err(LinkError::NotOpen);
        }
        if state.fail_reads {
            return Err(LinkError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected read failure",
            )));
        }
        state.drain_device_output();
        match state.inbound.take_line(terminator) {
            Some(line) => Ok(String::from_utf8_lossy(&line).into_owned()),
            None => Err(LinkError::Timeout(SIM_TIMEOUT)),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        let mut state = self.state();
        if !state.open {
            return Err(LinkError::NotOpen);
        }
        if state.fail_reads {
            return Err(LinkError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected read failure",
            )));
        }
        state.drain_device_output();
        if state.inbound.pending_len() < buf.len() {
            return Err(LinkError::Timeout(SIM_TIMEOUT));
        }
        buf.copy_from_slice(&state.inbound.take_exact(buf.len()));
        Ok(())
    }
}
