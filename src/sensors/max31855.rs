//! Bit-banged MAX31855 transport.
//!
//! Read-only SPI (mode 0) clocked by hand on three GPIOs: CS is pulled low,
//! 32 bits are shifted in MSB first on the clock's rising edge, then CS is
//! released.  With 1 ms half periods one transaction takes ~65 ms, well
//! inside the 1 s control cadence.
//!
//! Generic over `embedded-hal` 1.0 pin and delay traits so the same code
//! drives `rppal` pins on the Pi and mock pins in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::SensorTransport;
use crate::error::SensorError;

const FRAME_BITS: u32 = 32;
const HALF_PERIOD_US: u32 = 1_000;

pub struct Max31855<CS, CLK, MISO, D> {
    cs: CS,
    clk: CLK,
    miso: MISO,
    delay: D,
}

impl<CS, CLK, MISO, D> Max31855<CS, CLK, MISO, D>
where
    CS: OutputPin,
    CLK: OutputPin,
    MISO: InputPin,
    D: DelayNs,
{
    /// Take ownership of the pins and park the bus idle (CS high, CLK low).
    pub fn new(mut cs: CS, mut clk: CLK, miso: MISO, delay: D) -> Result<Self, SensorError> {
        cs.set_high().map_err(|_| SensorError::Bus)?;
        clk.set_low().map_err(|_| SensorError::Bus)?;
        Ok(Self {
            cs,
            clk,
            miso,
            delay,
        })
    }

    /// Release the pins.
    pub fn release(self) -> (CS, CLK, MISO, D) {
        (self.cs, self.clk, self.miso, self.delay)
    }

    fn shift_in(&mut self) -> Result<u32, SensorError> {
        let mut value = 0u32;
        for _ in 0..FRAME_BITS {
            self.clk.set_high().map_err(|_| SensorError::Bus)?;
            self.delay.delay_us(HALF_PERIOD_US);
            value <<= 1;
            if self.miso.is_high().map_err(|_| SensorError::Bus)? {
                value |= 1;
            }
            self.clk.set_low().map_err(|_| SensorError::Bus)?;
            self.delay.delay_us(HALF_PERIOD_US);
        }
        Ok(value)
    }
}

impl<CS, CLK, MISO, D> SensorTransport for Max31855<CS, CLK, MISO, D>
where
    CS: OutputPin,
    CLK: OutputPin,
    MISO: InputPin,
    D: DelayNs,
{
    fn read_raw(&mut self) -> Result<u32, SensorError> {
        self.cs.set_low().map_err(|_| SensorError::Bus)?;
        self.delay.delay_us(HALF_PERIOD_US);

        let frame = self.shift_in();

        // CS is released even when the shift failed part-way.
        let _ = self.clk.set_low();
        self.cs.set_high().map_err(|_| SensorError::Bus)?;
        frame
    }
}
