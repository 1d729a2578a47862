//! Inbound command lines and their classification.
//!
//! One [`Command`] is built per input line and discarded after dispatch.
//! Classification rules are checked in order, first match wins, and entries
//! disabled in the [`CommandSet`] fall through to the next rule.

use crate::config::CommandSet;

/// A classified command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set one PWM channel. Values are carried unvalidated; the dispatcher
    /// range-checks them against the live config.
    SetPwm { channel: i32, pulse_length: i32 },

    /// Return the PWM driver board to power-on defaults.
    Reset,

    /// Read exactly `count` raw bytes from the host stream and forward them
    /// verbatim to the peripheral.
    RelayBytes { count: usize },

    /// Open the peripheral link and send the wake handshake.
    StartPeripheral,

    /// Anything unrecognised. Carries the raw line for the optional
    /// diagnostic echo.
    Invalid { line: String },
}

impl Command {
    /// Classify one line (trailing newline already stripped).
    ///
    /// Rules, in order:
    /// 1. exact `reset`
    /// 2. prefix `roomba-start`
    /// 3. prefix `serial`, byte count after the first `:`
    /// 4. `<channel> <pulse>` split at the first interior space
    pub fn classify(line: &str, commands: &CommandSet) -> Self {
        if commands.reset && line == "reset" {
            return Self::Reset;
        }
        if commands.peripheral && line.starts_with("roomba-start") {
            return Self::StartPeripheral;
        }
        if commands.peripheral && line.starts_with("serial") {
            let count = match line.split_once(':') {
                Some((_, suffix)) => lenient_i32(suffix).max(0) as usize,
                None => 0,
            };
            return Self::RelayBytes { count };
        }

        // A leading space means an empty channel field; treat it like a
        // missing delimiter, as the original firmware did.
        match line.find(' ') {
            Some(pos) if pos > 0 => Self::SetPwm {
                channel: lenient_i32(&line[..pos]),
                pulse_length: lenient_i32(&line[pos + 1..]),
            },
            _ => Self::Invalid {
                line: line.to_string(),
            },
        }
    }
}

/// Lenient decimal-prefix integer parse.
///
/// Skips leading whitespace, accepts an optional sign, then consumes digits
/// until the first non-digit. Anything malformed parses as 0. This mirrors
/// the `String::toInt` semantics the deployed boards had, so host-side
/// tooling written against them keeps working; the behavior is pinned by
/// tests rather than left as an accident.
pub fn lenient_i32(s: &str) -> i32 {
    let s = s.trim_start();
    let mut chars = s.chars();
    let (negative, rest) = match chars.next() {
        Some('-') => (true, chars.as_str()),
        Some('+') => (false, chars.as_str()),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut saw_digit = false;
    for c in rest.chars() {
        let Some(d) = c.to_digit(10) else { break };
        saw_digit = true;
        value = (value * 10 + i64::from(d)).min(i64::from(i32::MAX));
    }

    if !saw_digit {
        return 0;
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
