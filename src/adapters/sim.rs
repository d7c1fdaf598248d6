//! Simulated kiln for running off-target.
//!
//! A first-order thermal model shared between a fake MAX31855
//! ([`SimThermocouple`], which emits real chip frames) and a fake relay
//! ([`SimHeater`]).  The model advances on wall-clock time whenever
//! either side touches it.
//!
//! ```text
//!   dT/dt = heater · heating_rate − loss · (T − ambient)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::app::ports::HeaterPort;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::SensorTransport;
use crate::sensors::thermocouple;

/// Plant parameters.
#[derive(Debug, Clone, Copy)]
pub struct ThermalParams {
    pub ambient_c: f32,
    /// Temperature rise per second with the element on and no losses.
    pub heating_rate_c_per_s: f32,
    /// Fraction of the excess over ambient lost per second.
    pub loss_per_s: f32,
}

impl Default for ThermalParams {
    fn default() -> Self {
        // Equilibrium with the element on: ambient + 2.0 / 0.002 ≈ 1020 °C.
        Self {
            ambient_c: 20.0,
            heating_rate_c_per_s: 2.0,
            loss_per_s: 0.002,
        }
    }
}

#[derive(Debug)]
pub struct ThermalModel {
    params: ThermalParams,
    temperature_c: f32,
    heater_on: bool,
    disconnected: bool,
    last: Instant,
}

impl ThermalModel {
    pub fn new(params: ThermalParams, now: Instant) -> Self {
        Self {
            params,
            temperature_c: params.ambient_c,
            heater_on: false,
            disconnected: false,
            last: now,
        }
    }

    /// Integrate forward by `dt_secs` (explicit Euler).
    pub fn step(&mut self, dt_secs: f32) {
        let p = &self.params;
        let heat = if self.heater_on {
            p.heating_rate_c_per_s
        } else {
            0.0
        };
        let loss = p.loss_per_s * (self.temperature_c - p.ambient_c);
        self.temperature_c += (heat - loss) * dt_secs;
    }

    /// Integrate up to `now`.
    pub fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        if dt > 0.0 {
            self.step(dt);
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    /// The frame the chip would return right now.
    pub fn frame(&self) -> u32 {
        if self.disconnected {
            u32::MAX
        } else {
            thermocouple::encode(self.temperature_c, self.params.ambient_c)
        }
    }
}

/// Shared model handle; clone it to hand the same kiln to both ports.
#[derive(Debug, Clone)]
pub struct SimKiln {
    model: Arc<Mutex<ThermalModel>>,
}

impl SimKiln {
    pub fn new(params: ThermalParams) -> Self {
        Self {
            model: Arc::new(Mutex::new(ThermalModel::new(params, Instant::now()))),
        }
    }

    /// Split into the sensor and heater halves.
    pub fn split(&self) -> (SimThermocouple, SimHeater) {
        (
            SimThermocouple { kiln: self.clone() },
            SimHeater { kiln: self.clone() },
        )
    }

    /// Make the chip stop answering (all-ones frames), or reconnect it.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.lock().disconnected = disconnected;
    }

    pub fn temperature(&self) -> f32 {
        self.lock().temperature()
    }

    pub fn heater_on(&self) -> bool {
        self.lock().heater_on()
    }

    fn lock(&self) -> MutexGuard<'_, ThermalModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimKiln {
    fn default() -> Self {
        Self::new(ThermalParams::default())
    }
}

/// Fake MAX31855 reading the shared model.
#[derive(Debug, Clone)]
pub struct SimThermocouple {
    kiln: SimKiln,
}

impl SensorTransport for SimThermocouple {
    fn read_raw(&mut self) -> Result<u32, SensorError> {
        let mut model = self.kiln.lock();
        model.advance(Instant::now());
        Ok(model.frame())
    }
}

/// Fake relay driving the shared model.
#[derive(Debug, Clone)]
pub struct SimHeater {
    kiln: SimKiln,
}

impl HeaterPort for SimHeater {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let mut model = self.kiln.lock();
        model.advance(Instant::now());
        model.heater_on = on;
        Ok(())
    }
}
