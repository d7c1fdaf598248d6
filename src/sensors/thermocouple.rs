//! MAX31855 frame decoding (K-type thermocouple).
//!
//! ```text
//!  31            18 17 16 15           4  3  2   1   0
//! ┌────────────────┬──┬──┬──────────────┬──┬───┬───┬──┐
//! │ TC temp (14b)  │ 0│ F│ internal(12b)│ 0│SCV│SCG│OC│
//! └────────────────┴──┴──┴──────────────┴──┴───┴───┴──┘
//!   0.25 °C / LSB, two's complement     0.0625 °C / LSB
//! ```

use crate::error::{SensorError, ThermocoupleFault};

const TC_LSB_C: f32 = 0.25;
const INTERNAL_LSB_C: f32 = 0.0625;
const FAULT_BIT: u32 = 1 << 16;

/// Type-K usable range.
pub const MIN_PLAUSIBLE_C: f32 = -270.0;
pub const MAX_PLAUSIBLE_C: f32 = 1372.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermocoupleReading {
    /// Hot-junction temperature (°C), cold-junction compensated by the chip.
    pub thermocouple_c: f32,
    /// Die (cold-junction) temperature (°C).
    pub internal_c: f32,
}

/// Decode a raw frame, rejecting faults and implausible values.
pub fn decode(frame: u32) -> Result<ThermocoupleReading, SensorError> {
    // MISO floats high when the chip is missing or unpowered.
    if frame == u32::MAX {
        return Err(SensorError::NoResponse);
    }
    if frame & FAULT_BIT != 0 {
        return Err(SensorError::Fault(ThermocoupleFault {
            open_circuit: frame & 0b001 != 0,
            short_to_gnd: frame & 0b010 != 0,
            short_to_vcc: frame & 0b100 != 0,
        }));
    }

    let tc = sign_extend((frame >> 18) & 0x3FFF, 14);
    let internal = sign_extend((frame >> 4) & 0x0FFF, 12);

    let thermocouple_c = tc as f32 * TC_LSB_C;
    if !(MIN_PLAUSIBLE_C..=MAX_PLAUSIBLE_C).contains(&thermocouple_c) {
        return Err(SensorError::OutOfRange);
    }

    Ok(ThermocoupleReading {
        thermocouple_c,
        internal_c: internal as f32 * INTERNAL_LSB_C,
    })
}

/// Build the frame the chip would emit for the given temperatures.
/// Used by the simulator and by tests.
pub fn encode(thermocouple_c: f32, internal_c: f32) -> u32 {
    let tc = ((thermocouple_c / TC_LSB_C).round() as i32 as u32) & 0x3FFF;
    let internal = ((internal_c / INTERNAL_LSB_C).round() as i32 as u32) & 0x0FFF;
    (tc << 18) | (internal << 4)
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}
