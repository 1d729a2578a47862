//! GPIO / peripheral assignments for the servobridge board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers or bus addresses.

// ---------------------------------------------------------------------------
// I²C bus (PCA9685 servo driver board)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

/// PCA9685 7-bit address with A5..A0 straps open (factory default).
pub const PCA9685_I2C_ADDR: u8 = 0x40;

/// I²C bus clock. The PCA9685 supports fast-mode.
pub const I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Host link (primary serial, line protocol)
// ---------------------------------------------------------------------------

/// UART0 doubles as the flashing/console port; the host speaks the line
/// protocol over it.
pub const HOST_UART_NUM: i32 = 0;
pub const HOST_UART_TX_GPIO: i32 = 43;
pub const HOST_UART_RX_GPIO: i32 = 44;

// ---------------------------------------------------------------------------
// Peripheral link (secondary serial, Roomba SCI)
// ---------------------------------------------------------------------------

pub const ROOMBA_UART_NUM: i32 = 1;
pub const ROOMBA_UART_TX_GPIO: i32 = 17;
pub const ROOMBA_UART_RX_GPIO: i32 = 18;

/// Driver-owned RX ring buffer for the Roomba UART (bytes).
pub const ROOMBA_UART_RX_BUF: i32 = 512;
