//! PCA9685 16-channel PWM servo driver (register level).
//!
//! Generic over [`embedded_hal::i2c::I2c`] so the same driver runs against
//! the real bus on ESP-IDF and a recording mock in host tests.
//!
//! The chip divides each refresh period into 4096 ticks; a channel's output
//! goes high at its ON tick and low at its OFF tick. The bridge always
//! starts the high phase at tick 0, so pulse length equals the OFF count.

use embedded_hal::i2c::I2c;

const REG_MODE1: u8 = 0x00;
const REG_LED0_ON_L: u8 = 0x06;
const REG_PRESCALE: u8 = 0xFE;

const MODE1_RESTART: u8 = 0x80;
const MODE1_AI: u8 = 0x20;
const MODE1_SLEEP: u8 = 0x10;

/// Hardware floor/ceiling of the PRESCALE register.
const PRESCALE_MIN: u64 = 0x03;
const PRESCALE_MAX: u64 = 0xFF;

pub struct Pca9685<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Program the refresh rate and wake the oscillator.
    ///
    /// PRESCALE may only be written while the oscillator sleeps, hence the
    /// sleep / program / wake / restart sequence. The caller should allow
    /// ~10 ms for the oscillator to settle before the first `set_pwm`.
    pub fn init(&mut self, oscillator_hz: u32, freq_hz: u16) -> Result<(), I2C::Error> {
        let prescale = prescale_for(oscillator_hz, freq_hz);
        self.i2c.write(self.addr, &[REG_MODE1, MODE1_AI | MODE1_SLEEP])?;
        self.i2c.write(self.addr, &[REG_PRESCALE, prescale])?;
        self.i2c.write(self.addr, &[REG_MODE1, MODE1_AI])?;
        self.i2c
            .write(self.addr, &[REG_MODE1, MODE1_AI | MODE1_RESTART])?;
        Ok(())
    }

    /// Set one channel's ON/OFF ticks with a single auto-increment write.
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), I2C::Error> {
        let reg = REG_LED0_ON_L + 4 * channel;
        self.i2c.write(
            self.addr,
            &[
                reg,
                (on & 0xFF) as u8,
                (on >> 8) as u8,
                (off & 0xFF) as u8,
                (off >> 8) as u8,
            ],
        )
    }

    /// Restore power-on defaults (all outputs off, registers cleared).
    pub fn reset(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[REG_MODE1, MODE1_RESTART])
    }

    /// Host-test access to the underlying bus.
    #[cfg(not(target_os = "espidf"))]
    pub fn i2c_ref(&self) -> &I2C {
        &self.i2c
    }
}

/// PRESCALE value for a target refresh rate:
/// `round(oscillator / (4096 × freq)) − 1`, clamped to the register range.
///
/// The deployed boards trim the nominal 25 MHz oscillator to 27 MHz, which
/// lands 50 Hz at prescale 131.
pub fn prescale_for(oscillator_hz: u32, freq_hz: u16) -> u8 {
    let denom = 4096u64 * u64::from(freq_hz);
    let rounded = (u64::from(oscillator_hz) + denom / 2) / denom;
    rounded
        .saturating_sub(1)
        .clamp(PRESCALE_MIN, PRESCALE_MAX) as u8
}
