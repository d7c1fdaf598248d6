//! Fuzz target: `thermocouple::decode`
//!
//! Any 32-bit frame must either decode to a temperature inside the
//! K-type range or be rejected with a `SensorError`; it must never panic.
//!
//! cargo fuzz run fuzz_thermocouple_frame

#![no_main]

use kilnctl::sensors::thermocouple::{self, MAX_PLAUSIBLE_C, MIN_PLAUSIBLE_C};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|frame: u32| {
    if let Ok(r) = thermocouple::decode(frame) {
        assert!((MIN_PLAUSIBLE_C..=MAX_PLAUSIBLE_C).contains(&r.thermocouple_c));
        assert!(r.internal_c.is_finite());
    }
});
