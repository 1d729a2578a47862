//! Primary-stream transport adapter.
//!
//! Implements [`HostPort`] over UART0 on ESP-IDF. On host targets the same
//! type speaks stdio, which makes `servobridge` runnable as an interactive
//! simulation (lines typed on stdin, responses on stdout).

use crate::app::ports::HostPort;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

pub struct HostSerial;

impl HostSerial {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl HostPort for HostSerial {
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        hw_init::uart_read(pins::HOST_UART_NUM, buf)
    }

    fn write_line(&mut self, line: &str) {
        hw_init::uart_write(pins::HOST_UART_NUM, line.as_bytes());
        hw_init::uart_write(pins::HOST_UART_NUM, b"\n");
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        hw_init::uart_write(pins::HOST_UART_NUM, bytes);
    }
}

/// Write all frames back to back, then flush.
#[cfg(not(target_os = "espidf"))]
fn write_frames(out: &mut impl std::io::Write, frames: &[&[u8]]) -> std::io::Result<()> {
    for frame in frames {
        out.write_all(frame)?;
    }
    out.flush()
}

#[cfg(not(target_os = "espidf"))]
impl HostPort for HostSerial {
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        use std::io::Read;
        // Blocking stdin read; fine for the interactive simulation, and the
        // contract only promises "possibly fewer bytes than asked".
        std::io::stdin().lock().read(buf).unwrap_or(0)
    }

    fn write_line(&mut self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = write_frames(&mut out, &[line.as_bytes(), b"\n"]) {
            log::warn!("host stdout write failed: {}", e);
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = write_frames(&mut out, &[bytes]) {
            log::warn!("host stdout write failed: {}", e);
        }
    }
}
