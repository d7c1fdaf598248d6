//! Inbound commands to the kiln service.
//!
//! These represent actions requested by the outside world (the HTTP
//! surface today) that the [`KilnService`](super::service::KilnService)
//! interprets and acts upon.  A [`StartCommand`] can only be built from
//! validated parameters, so an invalid request never reaches the session.

use serde_json::Value;

use crate::error::CommandError;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KilnCommand {
    /// Begin (or restart) a firing.
    Start(StartCommand),
    /// End the firing and release the heater.
    Stop,
}

/// Validated firing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartCommand {
    /// Target temperature (°C), always finite.
    pub setpoint: f32,
    /// Requested hold duration (seconds).
    pub hold_secs: u64,
}

impl StartCommand {
    /// Validate raw parameters.
    pub fn new(setpoint: f32, hold_secs: i64) -> Result<Self, CommandError> {
        if !setpoint.is_finite() {
            return Err(CommandError::InvalidSetpoint);
        }
        let hold_secs = u64::try_from(hold_secs).map_err(|_| CommandError::InvalidHoldTime)?;
        Ok(Self {
            setpoint,
            hold_secs,
        })
    }

    /// Parse a `{"set_point": .., "hold_time": ..}` payload.
    ///
    /// Both fields accept JSON numbers or numeric strings.  `hold_time`
    /// must be a whole number of seconds.
    pub fn from_json(payload: &Value) -> Result<Self, CommandError> {
        let obj = payload.as_object().ok_or(CommandError::Malformed)?;
        let setpoint = obj
            .get("set_point")
            .and_then(number_or_numeric_string)
            .ok_or(CommandError::InvalidSetpoint)?;
        let hold = obj
            .get("hold_time")
            .and_then(whole_seconds)
            .ok_or(CommandError::InvalidHoldTime)?;
        Self::new(setpoint as f32, hold)
    }
}

fn number_or_numeric_string(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn whole_seconds(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
