//! Outbound bridge events.
//!
//! The [`BridgeService`](super::service::BridgeService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. They are observability
//! only — the protocol responses on the host link are written separately and
//! are not affected by what a sink does with these.

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A validated `SetPwm` command was applied to the driver board.
    PwmApplied { channel: u8, pulse_length: u16 },

    /// A `SetPwm` command was rejected by range validation.
    PwmRejected { channel: i32, pulse_length: i32 },

    /// The PWM driver board was reset to power-on defaults.
    DriverReset,

    /// The peripheral link was opened and the wake handshake sent.
    PeripheralStarted,

    /// `count` host bytes were forwarded to the peripheral.
    BytesRelayed { count: usize },

    /// `count` buffered peripheral bytes were drained to the host.
    PeripheralDrained { count: usize },

    /// A line could not be classified (carries the raw line).
    InvalidLine { line: String },
}
