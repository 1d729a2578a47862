//! Bridge service — the domain core.
//!
//! [`BridgeService`] classifies each host line, range-checks its parameters,
//! and drives the port traits. All I/O flows through ports injected at call
//! sites, making the entire dispatch chain testable with fakes.
//!
//! ```text
//!  HostLink ──▶ ┌──────────────────────┐ ──▶ PwmPort
//!              │     BridgeService     │ ──▶ PeripheralPort
//!  HostLink ◀──│  classify · validate  │ ──▶ EventSink
//!              └──────────────────────┘
//! ```

use log::{debug, warn};

use crate::config::BridgeConfig;

use super::commands::Command;
use super::events::BridgeEvent;
use super::link::HostLink;
use super::ports::{DelayPort, EventSink, HostPort, PeripheralPort, PwmPort};

// Roomba SCI opcodes for the wake/mode handshake.
const SCI_START: u8 = 0x80;
const SCI_CONTROL: u8 = 0x82;
const SCI_PLAY_SONG: u8 = 0x8D;

/// Gap between handshake opcodes; the drive base needs time to switch modes.
const HANDSHAKE_GAP_MS: u32 = 50;

// Protocol response lines. These are a wire contract with the host-side
// controller; change them and the robot stops moving.
const RSP_RESET: &str = "pwm driver has been reset";
const RSP_STARTED: &str = "roomba started";
const RSP_SENT: &str = "sent";
const RSP_INVALID: &str = "invalid parameters";
const RSP_SET_PWM: &str = "set PWM";

/// Running counters, reported through `stats()` for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Lines processed, valid or not.
    pub lines: u64,
    /// Lines that produced an `invalid parameters` diagnostic.
    pub invalid: u64,
    /// Host bytes forwarded to the peripheral.
    pub relayed_bytes: u64,
    /// Peripheral bytes drained to the host.
    pub drained_bytes: u64,
}

/// The line command interpreter.
///
/// Stateless across lines except for the peripheral-connection flag and the
/// diagnostic counters; every line is classified and dispatched
/// independently, and invalid input always returns to the ready state.
pub struct BridgeService {
    config: BridgeConfig,
    peripheral_open: bool,
    stats: BridgeStats,
}

impl BridgeService {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            peripheral_open: false,
            stats: BridgeStats::default(),
        }
    }

    // ── Per-line dispatch ─────────────────────────────────────

    /// Classify and dispatch one host line to completion.
    ///
    /// `hw` satisfies all three hardware-facing ports — one adapter owns the
    /// board, and a single parameter avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn handle_line(
        &mut self,
        line: &str,
        hw: &mut (impl PwmPort + PeripheralPort + DelayPort),
        host: &mut HostLink<impl HostPort>,
        sink: &mut impl EventSink,
    ) {
        self.stats.lines += 1;
        let command = Command::classify(line, &self.config.commands);
        debug!("line {:?} -> {:?}", line, command);

        match command {
            Command::Reset => {
                hw.reset_driver();
                host.write_line(RSP_RESET);
                sink.emit(&BridgeEvent::DriverReset);
            }

            Command::SetPwm {
                channel,
                pulse_length,
            } => self.set_pwm(channel, pulse_length, line, hw, host, sink),

            Command::RelayBytes { count } => self.relay_bytes(count, hw, host, sink),

            Command::StartPeripheral => self.start_peripheral(hw, host, sink),

            Command::Invalid { line } => {
                self.reject(&line, host);
                sink.emit(&BridgeEvent::InvalidLine { line });
            }
        }
    }

    fn set_pwm(
        &mut self,
        channel: i32,
        pulse_length: i32,
        raw_line: &str,
        hw: &mut impl PwmPort,
        host: &mut HostLink<impl HostPort>,
        sink: &mut impl EventSink,
    ) {
        let channel_ok = (0..=i32::from(self.config.channel_max)).contains(&channel);
        let pulse_ok = pulse_length >= i32::from(self.config.servo_pulse_min)
            && pulse_length < i32::from(self.config.servo_pulse_max);

        if channel_ok && pulse_ok {
            hw.apply_pwm(channel as u8, pulse_length as u16);
            host.write_line(&format!(
                "{RSP_SET_PWM} {channel} pulseLength to {pulse_length}"
            ));
            sink.emit(&BridgeEvent::PwmApplied {
                channel: channel as u8,
                pulse_length: pulse_length as u16,
            });
        } else {
            self.reject(raw_line, host);
            sink.emit(&BridgeEvent::PwmRejected {
                channel,
                pulse_length,
            });
        }
    }

    fn relay_bytes(
        &mut self,
        count: usize,
        hw: &mut impl PeripheralPort,
        host: &mut HostLink<impl HostPort>,
        sink: &mut impl EventSink,
    ) {
        // The host sends the payload regardless, so it must be consumed even
        // if the peripheral is unhappy — otherwise the line framing desyncs.
        let payload = host.read_exact(count);

        self.ensure_peripheral_open(hw);
        hw.write_all(&payload);
        hw.flush();

        self.stats.relayed_bytes += payload.len() as u64;
        host.write_line(RSP_SENT);
        sink.emit(&BridgeEvent::BytesRelayed {
            count: payload.len(),
        });
    }

    fn start_peripheral(
        &mut self,
        hw: &mut (impl PeripheralPort + DelayPort),
        host: &mut HostLink<impl HostPort>,
        sink: &mut impl EventSink,
    ) {
        if let Err(e) = hw.open(self.config.peripheral_baud) {
            warn!("peripheral open failed: {}", e);
            host.write_line(RSP_INVALID);
            return;
        }
        self.peripheral_open = true;

        // SCI wake sequence: START, CONTROL, then play the (empty) song 0 as
        // an audible ready signal, with mode-switch gaps in between.
        hw.write_all(&[SCI_START]);
        hw.delay_ms(HANDSHAKE_GAP_MS);
        hw.write_all(&[SCI_CONTROL]);
        hw.delay_ms(HANDSHAKE_GAP_MS);
        hw.write_all(&[SCI_PLAY_SONG, 0x00]);

        host.write_line(RSP_STARTED);
        sink.emit(&BridgeEvent::PeripheralStarted);
    }

    fn reject(&mut self, raw_line: &str, host: &mut HostLink<impl HostPort>) {
        self.stats.invalid += 1;
        if self.config.commands.echo_invalid_line {
            host.write_line(raw_line);
        }
        host.write_line(RSP_INVALID);
    }

    fn ensure_peripheral_open(&mut self, hw: &mut impl PeripheralPort) {
        if self.peripheral_open && hw.is_open() {
            return;
        }
        match hw.open(self.config.peripheral_baud) {
            Ok(()) => self.peripheral_open = true,
            Err(e) => warn!("peripheral open failed before relay: {}", e),
        }
    }

    // ── Background poll ───────────────────────────────────────

    /// Best-effort drain of buffered peripheral bytes to the host, prefixed
    /// with a `roomba:<N>` line. Runs only between host lines and never
    /// waits for more peripheral data to arrive.
    ///
    /// Returns the number of bytes drained.
    pub fn poll_peripheral(
        &mut self,
        hw: &mut impl PeripheralPort,
        host: &mut HostLink<impl HostPort>,
        sink: &mut impl EventSink,
    ) -> usize {
        if !self.config.commands.peripheral || !self.peripheral_open {
            return 0;
        }
        let available = hw.bytes_available();
        if available == 0 {
            return 0;
        }

        let mut buf = vec![0u8; available];
        let n = hw.read_available(&mut buf);
        buf.truncate(n);
        if n == 0 {
            return 0;
        }

        host.write_line(&format!("roomba:{n}"));
        host.write_raw(&buf);

        self.stats.drained_bytes += n as u64;
        sink.emit(&BridgeEvent::PeripheralDrained { count: n });
        n
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether `roomba-start` (or a lazy relay open) has succeeded.
    pub fn peripheral_open(&self) -> bool {
        self.peripheral_open
    }

    /// Diagnostic counters since boot.
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }
}
