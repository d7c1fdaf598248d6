//! Raspberry Pi hardware adapter.
//!
//! Acquires the thermocouple and relay GPIOs through `rppal` and wraps
//! them in the generic `embedded-hal` drivers.  This is the only module
//! that touches real hardware.  Pins are returned to their previous mode
//! when the handles drop.

use log::info;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;

use crate::config::PinConfig;
use crate::drivers::relay::{Polarity, RelayDriver};
use crate::error::{Error, Result};
use crate::sensors::ThermocoupleReader;
use crate::sensors::max31855::Max31855;

pub type PiThermocouple = ThermocoupleReader<Max31855<OutputPin, OutputPin, InputPin, Delay>>;
pub type PiRelay = RelayDriver<OutputPin>;

/// Claim every pin.  Any failure aborts startup before the loop begins.
pub fn acquire(pins: &PinConfig) -> Result<(PiThermocouple, PiRelay)> {
    let gpio = Gpio::new().map_err(|_| Error::Init("GPIO controller"))?;
    let claim = |pin: u8, what: &'static str| gpio.get(pin).map_err(|_| Error::Init(what));

    // Park the relay at its OFF level from the first instruction.
    let polarity = if pins.relay_active_low {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    };
    let relay_pin = match polarity {
        Polarity::ActiveHigh => claim(pins.relay, "relay pin")?.into_output_low(),
        Polarity::ActiveLow => claim(pins.relay, "relay pin")?.into_output_high(),
    };
    let relay = RelayDriver::new(relay_pin, polarity)?;

    let cs = claim(pins.thermo_cs, "thermocouple CS pin")?.into_output_high();
    let clk = claim(pins.thermo_clock, "thermocouple clock pin")?.into_output_low();
    let miso = claim(pins.thermo_data, "thermocouple data pin")?.into_input();
    let chip = Max31855::new(cs, clk, miso, Delay::new())?;

    info!(
        "GPIO ready: CS={} CLK={} DO={} relay={} ({:?})",
        pins.thermo_cs, pins.thermo_clock, pins.thermo_data, pins.relay, polarity
    );
    Ok((ThermocoupleReader::new(chip), relay))
}
