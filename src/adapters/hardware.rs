//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the PCA9685 driver and the Roomba UART, exposing them through
//! [`PwmPort`], [`PeripheralPort`] and [`DelayPort`]. This is the only
//! module in the system that touches actual hardware; bus errors are logged
//! here and never propagate into the dispatch path.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{DelayPort, PeripheralError, PeripheralPort, PwmPort};
use crate::drivers::pca9685::Pca9685;
use crate::drivers::roomba_uart::RoombaUart;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C> {
    pwm: Pca9685<I2C>,
    roomba: RoombaUart,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(pwm: Pca9685<I2C>, roomba: RoombaUart) -> Self {
        Self { pwm, roomba }
    }

    /// Host-simulation access to the peripheral UART buffers.
    #[cfg(not(target_os = "espidf"))]
    pub fn roomba(&mut self) -> &mut RoombaUart {
        &mut self.roomba
    }
}

// ── PwmPort implementation ────────────────────────────────────

impl<I2C: I2c> PwmPort for HardwareAdapter<I2C> {
    fn apply_pwm(&mut self, channel: u8, pulse_length: u16) {
        // High phase starts at tick 0; pulse length is the OFF count.
        if let Err(e) = self.pwm.set_pwm(channel, 0, pulse_length) {
            warn!("PCA9685 write failed on channel {}: {:?}", channel, e);
        }
    }

    fn reset_driver(&mut self) {
        if let Err(e) = self.pwm.reset() {
            warn!("PCA9685 reset failed: {:?}", e);
        }
    }
}

// ── PeripheralPort implementation ─────────────────────────────

impl<I2C: I2c> PeripheralPort for HardwareAdapter<I2C> {
    fn open(&mut self, baud: u32) -> Result<(), PeripheralError> {
        self.roomba.open(baud)
    }

    fn is_open(&self) -> bool {
        self.roomba.is_open()
    }

    fn write_all(&mut self, bytes: &[u8]) {
        self.roomba.write(bytes);
    }

    fn flush(&mut self) {
        self.roomba.flush();
    }

    fn bytes_available(&self) -> usize {
        self.roomba.available()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        self.roomba.read_available(buf)
    }
}

// ── DelayPort implementation ──────────────────────────────────

impl<I2C: I2c> DelayPort for HardwareAdapter<I2C> {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
