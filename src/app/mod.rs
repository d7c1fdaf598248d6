//! Application core: domain orchestration behind port traits.
//!
//! The kiln's business rules (session lifecycle, filtering, PID control,
//! relay hysteresis) are wired together here.  All interaction with
//! hardware happens through the **port traits** defined in [`ports`], so
//! this layer is fully testable without real peripherals.

pub mod commands;
pub mod control_loop;
pub mod events;
pub mod ports;
pub mod service;
