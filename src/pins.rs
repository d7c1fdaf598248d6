//! Default GPIO pin assignments (BCM numbering, Raspberry Pi header).
//!
//! | Function              | BCM | Header pin |
//! |-----------------------|-----|------------|
//! | MAX31855 chip select  | 8   | 24         |
//! | MAX31855 clock        | 11  | 23         |
//! | MAX31855 data (MISO)  | 9   | 21         |
//! | Heater relay          | 20  | 38         |
//!
//! The MAX31855 is bit-banged on the SPI0 pins, so the kernel SPI driver
//! must be disabled (`dtparam=spi=off`).

/// MAX31855 chip select (active low).
pub const THERMO_CS_GPIO: u8 = 8;
/// MAX31855 serial clock.
pub const THERMO_CLK_GPIO: u8 = 11;
/// MAX31855 serial data out.
pub const THERMO_DATA_GPIO: u8 = 9;

/// Heater contactor relay.
pub const RELAY_GPIO: u8 = 20;
