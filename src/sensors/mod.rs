//! Sensor subsystem: the thermocouple transport and the [`ThermocoupleReader`]
//! that turns raw frames into calibrated temperatures.
//!
//! ```text
//!  SensorTransport::read_raw ──▶ thermocouple::decode ──▶ SensorPort::read
//!      (32-bit frame)             (fault + range checks)     (°C | SensorError)
//! ```

pub mod max31855;
pub mod thermocouple;

use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// One hardware transaction with the temperature chip.
pub trait SensorTransport {
    /// Clock out a single raw 32-bit frame.
    fn read_raw(&mut self) -> Result<u32, SensorError>;
}

impl<T: SensorTransport + ?Sized> SensorTransport for Box<T> {
    fn read_raw(&mut self) -> Result<u32, SensorError> {
        (**self).read_raw()
    }
}

/// Wraps a transport and exposes it through [`SensorPort`].
///
/// No retries: retry policy belongs to the control loop.
pub struct ThermocoupleReader<T: SensorTransport> {
    transport: T,
    /// Calibration offset added to every reading (°C).
    offset_c: f32,
}

impl<T: SensorTransport> ThermocoupleReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            offset_c: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_c: f32) -> Self {
        self.offset_c = offset_c;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: SensorTransport> SensorPort for ThermocoupleReader<T> {
    fn read(&mut self) -> Result<f32, SensorError> {
        let frame = self.transport.read_raw()?;
        let reading = thermocouple::decode(frame)?;
        Ok(reading.thermocouple_c + self.offset_c)
    }
}
