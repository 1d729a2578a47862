//! Hardware drivers, dual-target (ESP-IDF real / host simulation).

pub mod hw_init;
pub mod pca9685;
pub mod roomba_uart;
