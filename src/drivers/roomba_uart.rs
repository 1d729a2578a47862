//! Secondary UART driver for the Roomba drive base.
//!
//! The bridge never interprets this stream; bytes pass through verbatim in
//! both directions.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives UART1 through the hw_init helpers.
//! On host/test: in-memory RX/TX buffers with injection hooks so the relay
//! paths can be exercised without hardware.

use log::{debug, warn};

use crate::app::ports::PeripheralError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

pub struct RoombaUart {
    open_baud: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_rx: std::collections::VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    sim_tx: Vec<u8>,
    #[cfg(not(target_os = "espidf"))]
    sim_flushes: u32,
}

impl RoombaUart {
    pub fn new() -> Self {
        Self {
            open_baud: None,
            #[cfg(not(target_os = "espidf"))]
            sim_rx: std::collections::VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_tx: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_flushes: 0,
        }
    }

    /// Install and configure the UART. Idempotent once open; a second open
    /// at a different baud keeps the first configuration.
    pub fn open(&mut self, baud: u32) -> Result<(), PeripheralError> {
        if let Some(current) = self.open_baud {
            if current != baud {
                warn!("roomba uart already open at {} baud, ignoring {}", current, baud);
            }
            return Ok(());
        }
        self.open_hw(baud)?;
        self.open_baud = Some(baud);
        debug!("roomba uart open at {} baud", baud);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open_baud.is_some()
    }

    /// Write every byte. Bytes written before `open` are dropped (the
    /// original hardware did the same: writes to an unopened port vanish).
    pub fn write(&mut self, bytes: &[u8]) {
        if !self.is_open() {
            debug!("roomba uart closed, dropping {} bytes", bytes.len());
            return;
        }
        self.write_hw(bytes);
    }

    /// Number of received bytes currently buffered.
    pub fn available(&self) -> usize {
        if !self.is_open() {
            return 0;
        }
        self.available_hw()
    }

    /// Read up to `buf.len()` buffered bytes without waiting.
    pub fn read_available(&mut self, buf: &mut [u8]) -> usize {
        if !self.is_open() {
            return 0;
        }
        self.read_hw(buf)
    }

    /// Block until the transmitter has drained.
    pub fn flush(&mut self) {
        if !self.is_open() {
            return;
        }
        self.flush_hw();
    }

    // ── ESP-IDF backend ───────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn open_hw(&mut self, baud: u32) -> Result<(), PeripheralError> {
        hw_init::uart_open(
            pins::ROOMBA_UART_NUM,
            baud,
            pins::ROOMBA_UART_TX_GPIO,
            pins::ROOMBA_UART_RX_GPIO,
            pins::ROOMBA_UART_RX_BUF,
        )
        .map_err(|_| PeripheralError::OpenFailed("uart driver install"))
    }

    #[cfg(target_os = "espidf")]
    fn write_hw(&mut self, bytes: &[u8]) {
        hw_init::uart_write(pins::ROOMBA_UART_NUM, bytes);
    }

    #[cfg(target_os = "espidf")]
    fn available_hw(&self) -> usize {
        hw_init::uart_available(pins::ROOMBA_UART_NUM)
    }

    #[cfg(target_os = "espidf")]
    fn read_hw(&mut self, buf: &mut [u8]) -> usize {
        hw_init::uart_read(pins::ROOMBA_UART_NUM, buf)
    }

    #[cfg(target_os = "espidf")]
    fn flush_hw(&mut self) {
        hw_init::uart_flush_tx(pins::ROOMBA_UART_NUM);
    }

    // ── Host simulation backend ───────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn open_hw(&mut self, _baud: u32) -> Result<(), PeripheralError> {
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_hw(&mut self, bytes: &[u8]) {
        self.sim_tx.extend_from_slice(bytes);
    }

    #[cfg(not(target_os = "espidf"))]
    fn available_hw(&self) -> usize {
        self.sim_rx.len()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_hw(&mut self, buf: &mut [u8]) -> usize {
        let n = self.sim_rx.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.sim_rx.pop_front().unwrap_or(0);
        }
        n
    }

    #[cfg(not(target_os = "espidf"))]
    fn flush_hw(&mut self) {
        self.sim_flushes += 1;
    }

    // ── Host simulation hooks ─────────────────────────────────

    /// Queue bytes as if the peripheral had sent them.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_inject_rx(&mut self, bytes: &[u8]) {
        self.sim_rx.extend(bytes);
    }

    /// Everything written to the peripheral so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_tx(&self) -> &[u8] {
        &self.sim_tx
    }

    /// How many times the transmitter was flushed.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_flush_count(&self) -> u32 {
        self.sim_flushes
    }
}
