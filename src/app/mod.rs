//! Bridge core — pure domain logic, zero I/O.
//!
//! This module contains the line-protocol rules for the servobridge: command
//! classification, parameter validation, host-stream framing, and dispatch.
//! All interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod link;
pub mod ports;
pub mod service;
