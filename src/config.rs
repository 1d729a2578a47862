//! Bridge configuration parameters.
//!
//! All tunable parameters for the servobridge firmware. The defaults are the
//! constants the deployed boards shipped with; a host-side tool can read the
//! config back (or push a variant table) as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which commands the line classifier recognises.
///
/// The bridge historically existed in several near-identical builds: with and
/// without the reset command, with and without the Roomba relay. Those
/// variants collapse into this table — a disabled entry simply falls through
/// to the next classifier rule, exactly like the build that lacked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSet {
    /// Recognise the `reset` line (PWM driver power-on reset).
    pub reset: bool,
    /// Recognise `roomba-start` / `serial:<N>` and run the background
    /// peripheral poll.
    pub peripheral: bool,
    /// Echo the raw line before the `invalid parameters` diagnostic
    /// (debug builds of the original did this).
    pub echo_invalid_line: bool,
}

/// Core bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- Servo limits ---
    /// Minimum safe pulse length count (out of 4096), inclusive.
    pub servo_pulse_min: u16,
    /// Maximum safe pulse length count (out of 4096), exclusive.
    pub servo_pulse_max: u16,
    /// Highest addressable PWM channel (inclusive; the expander board
    /// exposes 0–16).
    pub channel_max: u8,

    // --- PWM driver ---
    /// Servo refresh rate. Analog servos run at ~50 Hz updates.
    pub servo_freq_hz: u16,
    /// PCA9685 internal oscillator trim used for prescale computation.
    pub oscillator_hz: u32,

    // --- Serial links ---
    /// Host link baud rate (line protocol).
    pub host_baud: u32,
    /// Peripheral link baud rate (Roomba SCI).
    pub peripheral_baud: u32,

    // --- Command table ---
    pub commands: CommandSet,
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            reset: true,
            peripheral: true,
            echo_invalid_line: true,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            // Empirically safe analog-servo range on the deployed hardware.
            servo_pulse_min: 110,
            servo_pulse_max: 480,
            channel_max: 16,

            servo_freq_hz: 50,
            oscillator_hz: 27_000_000,

            host_baud: 9_600,
            peripheral_baud: 19_200,

            commands: CommandSet::default(),
        }
    }
}

impl BridgeConfig {
    /// Range-check the configuration before wiring it into the service.
    ///
    /// Invalid values are rejected, not clamped — a bad variant table should
    /// fail loudly at boot rather than quietly drive servos past their stops.
    pub fn validate(&self) -> Result<()> {
        if self.servo_pulse_min >= self.servo_pulse_max {
            return Err(Error::Config("servo_pulse_min must be below servo_pulse_max"));
        }
        if self.servo_pulse_max > 4096 {
            return Err(Error::Config("servo_pulse_max exceeds the 4096-tick cycle"));
        }
        // PCA9685 prescale register limits the output frequency range.
        if !(24..=1526).contains(&self.servo_freq_hz) {
            return Err(Error::Config("servo_freq_hz outside PCA9685 range (24-1526 Hz)"));
        }
        if self.oscillator_hz == 0 {
            return Err(Error::Config("oscillator_hz must be non-zero"));
        }
        if self.host_baud == 0 || self.peripheral_baud == 0 {
            return Err(Error::Config("baud rates must be non-zero"));
        }
        Ok(())
    }
}
