//! Outbound application events and the status snapshot.
//!
//! The [`KilnService`](super::service::KilnService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::control::hysteresis::HeaterCommand;
use crate::error::{ActuatorError, SensorError};
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum KilnEvent {
    /// A firing began.
    Started { setpoint: f32, hold_secs: u64 },

    /// A firing ended by command, hold completion, or shutdown.
    Stopped { elapsed_secs: f64 },

    /// The sensor failed while firing; the heater was forced off.
    SensorFault(SensorError),

    /// A relay write failed; the heater command was forced off.
    HeaterFault(ActuatorError),

    /// The relay command changed.
    HeaterSwitched(HeaterCommand),

    /// The requested hold time has elapsed.
    HoldExpired { hold_secs: u64 },

    /// Periodic telemetry snapshot.
    Telemetry(KilnStatus),
}

/// Point-in-time status, as served by the command surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KilnStatus {
    pub state: StateId,
    pub running: bool,
    /// Last sample; `None` after a failed read or before the first one.
    pub current_temperature: Option<f32>,
    pub smoothed_temperature: Option<f32>,
    pub set_point: f32,
    pub hold_time_total: u64,
    /// Seconds since the firing started, frozen once it ends.
    pub elapsed_time: f64,
    pub heater_on: bool,
    /// Last PID output in [0, 1].
    pub control_output: Option<f32>,
    pub hold_expired: bool,
}
