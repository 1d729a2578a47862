//! One-shot hardware peripheral initialization and raw UART helpers.
//!
//! Configures the UART drivers using raw ESP-IDF sys calls. Called once from
//! `main()` before the poll loop starts; the I²C bus is owned by the typed
//! `esp-idf-hal` driver instead and is not touched here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    UartConfigFailed(i32),
    UartInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UartConfigFailed(rc) => write!(f, "UART config failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

/// Install the host-link UART. The Roomba UART is opened lazily by its
/// driver when the peripheral is first used.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(host_baud: u32) -> Result<(), HwInitError> {
    uart_open(
        pins::HOST_UART_NUM,
        host_baud,
        pins::HOST_UART_TX_GPIO,
        pins::HOST_UART_RX_GPIO,
        512,
    )?;
    info!("hw_init: host uart configured at {} baud", host_baud);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_host_baud: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── UART helpers ──────────────────────────────────────────────

/// Configure pins and install the driver for one UART port.
#[cfg(target_os = "espidf")]
pub fn uart_open(
    port: i32,
    baud: u32,
    tx_gpio: i32,
    rx_gpio: i32,
    rx_buf: i32,
) -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: baud as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };

    // SAFETY: Called from the single-threaded init/dispatch path; the port
    // number comes from pins.rs and is valid for this SoC.
    unsafe {
        let ret = uart_param_config(port, &cfg);
        if ret != ESP_OK {
            return Err(HwInitError::UartConfigFailed(ret));
        }
        let ret = uart_set_pin(
            port,
            tx_gpio,
            rx_gpio,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        );
        if ret != ESP_OK {
            return Err(HwInitError::UartConfigFailed(ret));
        }
        let ret = uart_driver_install(port, rx_buf, 0, 0, core::ptr::null_mut(), 0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::UartInstallFailed(ret));
        }
    }
    Ok(())
}

/// Write every byte of `bytes` to `port`.
#[cfg(target_os = "espidf")]
pub fn uart_write(port: i32, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    // SAFETY: The driver was installed by uart_open; uart_write_bytes copies
    // the buffer into the TX ring before returning.
    unsafe {
        uart_write_bytes(port, bytes.as_ptr().cast(), bytes.len());
    }
}

/// Read whatever is buffered on `port`, up to `buf.len()`. Never blocks.
#[cfg(target_os = "espidf")]
pub fn uart_read(port: i32, buf: &mut [u8]) -> usize {
    // SAFETY: A zero-tick timeout makes uart_read_bytes return only what is
    // already in the RX ring buffer.
    let n = unsafe { uart_read_bytes(port, buf.as_mut_ptr().cast(), buf.len() as u32, 0) };
    if n < 0 {
        return 0;
    }
    n as usize
}

/// Number of received bytes buffered on `port`.
#[cfg(target_os = "espidf")]
pub fn uart_available(port: i32) -> usize {
    let mut len: usize = 0;
    // SAFETY: Read-only query against an installed driver.
    let ret = unsafe { uart_get_buffered_data_len(port, &mut len) };
    if ret != ESP_OK {
        return 0;
    }
    len
}

/// Block until the TX FIFO of `port` has drained.
#[cfg(target_os = "espidf")]
pub fn uart_flush_tx(port: i32) {
    // SAFETY: portMAX_DELAY blocks until the transmitter is idle, matching
    // the relay protocol's flush-before-acknowledge contract.
    unsafe {
        uart_wait_tx_done(port, 0xFFFF_FFFF);
    }
}
