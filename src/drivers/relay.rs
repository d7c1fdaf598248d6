//! Heater contactor relay driver.
//!
//! Drives one GPIO through the `embedded-hal` [`OutputPin`] trait.  Boards
//! differ in polarity, so the active level is configurable.
//!
//! ## Safety contract
//!
//! The relay is forced OFF when the driver is constructed and again when it
//! is dropped, so every exit path (normal shutdown, early `?` return, panic
//! unwind) releases the heating element.  This driver is otherwise dumb;
//! switching policy lives in the hysteresis actuator.

use embedded_hal::digital::{OutputPin, PinState};
use log::{error, info};

use crate::app::ports::HeaterPort;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    polarity: Polarity,
    energised: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and immediately drive it to the OFF level.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self, ActuatorError> {
        let mut relay = Self {
            pin,
            polarity,
            energised: false,
        };
        relay.set(false)?;
        Ok(relay)
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    fn level(&self, on: bool) -> PinState {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        PinState::from(high)
    }
}

impl<P: OutputPin> HeaterPort for RelayDriver<P> {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let level = self.level(on);
        self.pin
            .set_state(level)
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.energised = on;
        Ok(())
    }
}

impl<P: OutputPin> Drop for RelayDriver<P> {
    fn drop(&mut self) {
        match self.set(false) {
            Ok(()) => info!("Relay released (OFF)"),
            Err(e) => error!("Relay release failed: {e}"),
        }
    }
}
