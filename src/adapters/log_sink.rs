//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured bridge events to the
//! logger (UART / USB-CDC in production). These records are observability
//! only; the protocol responses the host parses are written by the service
//! through the host link, not here.

use log::{info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::PwmApplied {
                channel,
                pulse_length,
            } => {
                info!("PWM   | ch={} pulse={}", channel, pulse_length);
            }
            BridgeEvent::PwmRejected {
                channel,
                pulse_length,
            } => {
                warn!("PWM   | rejected ch={} pulse={}", channel, pulse_length);
            }
            BridgeEvent::DriverReset => {
                info!("PWM   | driver reset");
            }
            BridgeEvent::PeripheralStarted => {
                info!("PERIPH| started");
            }
            BridgeEvent::BytesRelayed { count } => {
                info!("RELAY | host->periph {} bytes", count);
            }
            BridgeEvent::PeripheralDrained { count } => {
                info!("RELAY | periph->host {} bytes", count);
            }
            BridgeEvent::InvalidLine { line } => {
                warn!("LINE  | invalid: {:?}", line);
            }
        }
    }
}
