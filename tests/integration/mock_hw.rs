//! Mock hardware and transport fakes for integration tests.
//!
//! Records every hardware-facing call so tests can assert on the full
//! command history without touching real I2C/UART drivers.

use std::collections::VecDeque;

use servobridge::app::events::BridgeEvent;
use servobridge::app::ports::{
    DelayPort, EventSink, HostPort, PeripheralError, PeripheralPort, PwmPort,
};

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    ApplyPwm { channel: u8, pulse_length: u16 },
    ResetDriver,
    Open { baud: u32 },
    Write(Vec<u8>),
    Flush,
    DelayMs(u32),
}

// ── MockHardware ──────────────────────────────────────────────

/// Fake for all three hardware-facing ports on one struct, mirroring the
/// production adapter that owns the whole board.
pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub open: bool,
    /// When set, `open` fails with this message instead of succeeding.
    pub fail_open: Option<&'static str>,
    /// Bytes the peripheral has "sent" and not yet been drained.
    pub rx: VecDeque<u8>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            open: false,
            fail_open: None,
            rx: VecDeque::new(),
        }
    }

    /// Queue bytes as if the peripheral had transmitted them.
    pub fn inject_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Every byte written to the peripheral, across all `Write` calls.
    pub fn written(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .concat()
    }

    pub fn pwm_calls(&self) -> Vec<(u8, u16)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::ApplyPwm {
                    channel,
                    pulse_length,
                } => Some((*channel, *pulse_length)),
                _ => None,
            })
            .collect()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::DelayMs(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == HwCall::Flush).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmPort for MockHardware {
    fn apply_pwm(&mut self, channel: u8, pulse_length: u16) {
        self.calls.push(HwCall::ApplyPwm {
            channel,
            pulse_length,
        });
    }

    fn reset_driver(&mut self) {
        self.calls.push(HwCall::ResetDriver);
    }
}

impl PeripheralPort for MockHardware {
    fn open(&mut self, baud: u32) -> Result<(), PeripheralError> {
        self.calls.push(HwCall::Open { baud });
        if let Some(msg) = self.fail_open {
            return Err(PeripheralError::OpenFailed(msg));
        }
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_all(&mut self, bytes: &[u8]) {
        self.calls.push(HwCall::Write(bytes.to_vec()));
    }

    fn flush(&mut self) {
        self.calls.push(HwCall::Flush);
    }

    fn bytes_available(&self) -> usize {
        self.rx.len()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = self.rx.len().min(buf.len());
        for b in buf.iter_mut().take(n) {
            *b = self.rx.pop_front().unwrap();
        }
        n
    }
}

impl DelayPort for MockHardware {
    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::DelayMs(ms));
    }
}

// ── MockHost ──────────────────────────────────────────────────

/// Scripted host transport: hands out queued input chunks one per read and
/// captures everything the bridge writes back.
pub struct MockHost {
    chunks: VecDeque<Vec<u8>>,
    pub lines: Vec<String>,
    pub raw: Vec<u8>,
}

#[allow(dead_code)]
impl MockHost {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            lines: Vec::new(),
            raw: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

impl HostPort for MockHost {
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let Some(chunk) = self.chunks.front_mut() else {
            return 0;
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        chunk.drain(..n);
        if chunk.is_empty() {
            self.chunks.pop_front();
        }
        n
    }

    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        self.raw.extend_from_slice(bytes);
    }
}

// ── LogSink ───────────────────────────────────────────────────

pub struct LogSink {
    pub events: Vec<BridgeEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(event.clone());
    }
}
