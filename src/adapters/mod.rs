//! Port implementations: real hardware, host link transport, and logging.

pub mod hardware;
pub mod host_serial;
pub mod log_sink;
