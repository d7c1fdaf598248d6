//! Hysteresis actuator: continuous heater demand → relay on/off.
//!
//! ```text
//!   demand  0.0 ─────── 0.4 ═══ dead band ═══ 0.6 ─────── 1.0
//!           ◀── OFF ───┤                      ├─── ON ──▶
//! ```
//!
//! Inside the dead band the previous command is kept, which stops the
//! contactor chattering around the PID's steady-state output.
//!
//! ## Fail-safe contract
//!
//! Any driver error while applying a command is logged and the in-memory
//! command is forced to OFF (with a best-effort OFF write).

use log::{debug, error};
use serde::Serialize;

use crate::app::ports::HeaterPort;
use crate::error::ActuatorError;

/// Binary relay command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaterCommand {
    #[default]
    Off,
    On,
}

impl HeaterCommand {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Pure switching rule, separated from the driver for property testing.
pub fn next_command(current: HeaterCommand, output: f32, low: f32, high: f32) -> HeaterCommand {
    if output >= high {
        HeaterCommand::On
    } else if output <= low {
        HeaterCommand::Off
    } else {
        current
    }
}

/// Owns the heater driver and the current relay command.
pub struct HysteresisActuator<H: HeaterPort> {
    driver: H,
    command: HeaterCommand,
    high: f32,
    low: f32,
    /// Error from the most recent driver write, if it failed.
    last_error: Option<ActuatorError>,
}

impl<H: HeaterPort> HysteresisActuator<H> {
    pub fn new(driver: H, low: f32, high: f32) -> Self {
        Self {
            driver,
            command: HeaterCommand::Off,
            high,
            low,
            last_error: None,
        }
    }

    /// Map a PID output to a relay command and apply it.
    ///
    /// Outside the dead band the command is (re)asserted on the driver
    /// every call; inside it nothing is written.
    pub fn drive(&mut self, output: f32) -> HeaterCommand {
        let next = next_command(self.command, output, self.low, self.high);
        if output > self.low && output < self.high {
            return self.command;
        }
        if next != self.command {
            debug!("Relay turned {}", if next.is_on() { "ON" } else { "OFF" });
        }
        self.apply(next);
        self.command
    }

    /// Force the relay OFF regardless of hysteresis state.
    pub fn force_off(&mut self) -> Result<(), ActuatorError> {
        self.apply(HeaterCommand::Off);
        match self.last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn command(&self) -> HeaterCommand {
        self.command
    }

    pub fn last_error(&self) -> Option<ActuatorError> {
        self.last_error
    }

    pub fn driver(&self) -> &H {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut H {
        &mut self.driver
    }

    fn apply(&mut self, cmd: HeaterCommand) {
        match self.driver.set(cmd.is_on()) {
            Ok(()) => {
                self.command = cmd;
                self.last_error = None;
            }
            Err(e) => {
                error!("Error controlling kiln: {e}");
                self.command = HeaterCommand::Off;
                self.last_error = Some(e);
                if cmd.is_on() {
                    if let Err(e) = self.driver.set(false) {
                        error!("Fail-safe relay OFF write also failed: {e}");
                    }
                }
            }
        }
    }
}
