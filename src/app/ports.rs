//! Port traits — the boundary between the bridge logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BridgeService (domain)
//! ```
//!
//! Driven adapters (PWM driver board, peripheral UART, host link) implement
//! these traits. The [`BridgeService`](super::service::BridgeService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every hardware side effect can be faked in tests.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// PWM driver port (domain → servo driver board)
// ───────────────────────────────────────────────────────────────

/// Capability boundary around the servo driver chip.
///
/// The bridge validates ranges *before* calling in; implementations are dumb
/// actuators and must not re-interpret the values.
pub trait PwmPort {
    /// Set `channel`'s duty cycle: high phase starts at tick 0 and lasts
    /// `pulse_length` of the 4096-tick cycle.
    fn apply_pwm(&mut self, channel: u8, pulse_length: u16);

    /// Return the driver board to its power-on default state.
    fn reset_driver(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Peripheral port (domain → secondary serial device)
// ───────────────────────────────────────────────────────────────

/// The secondary serial stream. Bytes written here are forwarded verbatim;
/// the bridge never interprets the peripheral's protocol.
pub trait PeripheralPort {
    /// Open the stream at `baud`. Idempotent once open.
    fn open(&mut self, baud: u32) -> Result<(), PeripheralError>;

    /// Whether [`open`](Self::open) has succeeded.
    fn is_open(&self) -> bool;

    /// Write every byte of `bytes` to the stream.
    fn write_all(&mut self, bytes: &[u8]);

    /// Block until all written bytes have left the transmitter.
    fn flush(&mut self);

    /// Number of received bytes currently buffered. Never blocks.
    fn bytes_available(&self) -> usize;

    /// Read up to `buf.len()` currently-buffered bytes; returns the count.
    /// Never waits for more data to arrive.
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Host port (domain ↔ primary serial stream)
// ───────────────────────────────────────────────────────────────

/// Raw byte transport on the primary stream. Line framing lives in
/// [`HostLink`](super::link::HostLink), not here.
pub trait HostPort {
    /// Read up to `buf.len()` bytes; may return fewer than requested,
    /// including zero when nothing has arrived yet.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Write `line` followed by a newline.
    fn write_line(&mut self, line: &str);

    /// Write raw bytes with no framing.
    fn write_raw(&mut self, bytes: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Delay port
// ───────────────────────────────────────────────────────────────

/// Blocking millisecond delay, injected so the handshake timing is
/// observable in tests instead of actually sleeping.
pub trait DelayPort {
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The bridge emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port. Adapters decide where they go (serial log today; a
/// telemetry channel would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`PeripheralPort`] operations. Only `open` can fail; writes
/// against a closed stream are dropped by the driver, matching the original
/// hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralError {
    /// The UART driver could not be installed or configured.
    OpenFailed(&'static str),
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(msg) => write!(f, "open failed: {msg}"),
        }
    }
}
