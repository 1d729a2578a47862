//! Servobridge — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter        HostSerial        LogEventSink   │
//! │  (Pwm+Peripheral+Delay) (HostPort)        (EventSink)    │
//! │                                                          │
//! │  ────────────── Port Trait Boundary ───────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          BridgeService (pure logic)            │      │
//! │  │  classify · validate · relay · handshake       │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! This binary is only built with the `espidf` feature; host-side testing
//! goes through the library crate and its mock adapters.

#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use servobridge::adapters::hardware::HardwareAdapter;
use servobridge::adapters::host_serial::HostSerial;
use servobridge::adapters::log_sink::LogEventSink;
use servobridge::app::link::HostLink;
use servobridge::app::service::BridgeService;
use servobridge::config::BridgeConfig;
use servobridge::drivers::hw_init;
use servobridge::error::Error;
use servobridge::drivers::pca9685::Pca9685;
use servobridge::drivers::roomba_uart::RoombaUart;
use servobridge::pins;

/// Idle sleep between loop iterations when neither stream has data.
const IDLE_POLL: Duration = Duration::from_millis(2);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("servobridge v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = BridgeConfig::default();
    config.validate().context("bridge config rejected")?;

    // ── 3. Peripheral bring-up ────────────────────────────────
    hw_init::init_peripherals(config.host_baud)
        .map_err(Error::from)
        .context("hw init failed")?;

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    // GPIO choices mirror pins.rs (the typed HAL wants the concrete pins).
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )
    .context("I2C driver init failed")?;

    let mut pwm = Pca9685::new(i2c, pins::PCA9685_I2C_ADDR);
    pwm.init(config.oscillator_hz, config.servo_freq_hz)
        .map_err(|e| anyhow!("PCA9685 init failed: {e:?}"))?;
    // Let the chip's oscillator settle before the first channel write.
    std::thread::sleep(Duration::from_millis(10));

    // ── 4. Adapters and service ───────────────────────────────
    let mut hw = HardwareAdapter::new(pwm, RoombaUart::new());
    let mut link = HostLink::new(HostSerial::new());
    let mut sink = LogEventSink::new();
    let mut service = BridgeService::new(config);

    info!("bridge ready, entering poll loop");

    // ── 5. Poll loop ──────────────────────────────────────────
    //
    // Single-threaded and cooperative: each iteration handles at most one
    // complete host line, or drains whatever the peripheral has buffered.
    // A relay command blocks the whole loop until its byte count is met;
    // that is the protocol's contract.
    loop {
        if let Some(line) = link.poll_line() {
            service.handle_line(&line, &mut hw, &mut link, &mut sink);
        } else if service.poll_peripheral(&mut hw, &mut link, &mut sink) == 0 {
            std::thread::sleep(IDLE_POLL);
        }
    }
}
