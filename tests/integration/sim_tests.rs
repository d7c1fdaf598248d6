//! End-to-end run against the simulated kiln: real MAX31855 frames,
//! decoding, control, and relay writes through the shared thermal model.

use std::time::{Duration, Instant};

use crate::mock_hw::RecordingSink;

use kilnctl::adapters::sim::{SimHeater, SimKiln};
use kilnctl::app::control_loop::ControlLoop;
use kilnctl::app::events::KilnEvent;
use kilnctl::app::service::{KilnHandle, KilnService};
use kilnctl::config::KilnConfig;
use kilnctl::error::SensorError;
use kilnctl::sensors::ThermocoupleReader;

fn make_handle(heater: SimHeater) -> KilnHandle<SimHeater, RecordingSink> {
    KilnHandle::new(KilnService::new(
        &KilnConfig::default(),
        heater,
        RecordingSink::new(),
        Instant::now(),
    ))
}

#[test]
fn firing_energises_simulated_element() {
    let kiln = SimKiln::default();
    let (tc, heater) = kiln.split();
    let handle = make_handle(heater);
    let mut lp = ControlLoop::new(
        ThermocoupleReader::new(tc),
        handle.clone(),
        Duration::from_secs(1),
    );

    handle.start(900.0, 3600).unwrap();
    assert!(lp.step());
    assert!(kiln.heater_on());
    let t = handle.status().current_temperature.unwrap();
    assert!((t - 20.0).abs() < 1.0, "got {t}");

    handle.stop();
    assert!(!kiln.heater_on());
}

#[test]
fn unplugged_thermocouple_trips_fail_safe() {
    let kiln = SimKiln::default();
    let (tc, heater) = kiln.split();
    let handle = make_handle(heater);
    let mut lp = ControlLoop::new(
        ThermocoupleReader::new(tc),
        handle.clone(),
        Duration::from_secs(1),
    );

    handle.start(900.0, 3600).unwrap();
    lp.step();
    assert!(kiln.heater_on());

    kiln.set_disconnected(true);
    lp.step();
    assert!(!kiln.heater_on());
    assert!(!handle.is_running());
    assert!(
        handle
            .lock()
            .sink()
            .events
            .contains(&KilnEvent::SensorFault(SensorError::NoResponse))
    );
}
