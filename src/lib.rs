//! Kiln controller library.
//!
//! Exposes the control core (filter, PID, hysteresis, session FSM), the
//! application service and its ports, and the adapters for integration
//! testing and for the `kilnctl` binary.  Raspberry Pi GPIO support is
//! gated behind the `rpi` feature, the HTTP surface behind `http`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
#[cfg(feature = "http")]
pub mod http;
pub mod pins;
pub mod sensors;
pub mod session;
