//! Integration tests for the ControlLoop ↔ KilnHandle boundary, stepped
//! by hand and on a real thread.

use std::thread;
use std::time::{Duration, Instant};

use crate::mock_hw::{MockHeater, MockSensor, PanickingSensor, RecordingSink};

use kilnctl::app::control_loop::ControlLoop;
use kilnctl::app::events::KilnEvent;
use kilnctl::app::service::{KilnHandle, KilnService};
use kilnctl::config::KilnConfig;
use kilnctl::error::SensorError;

fn make_handle() -> KilnHandle<MockHeater, RecordingSink> {
    KilnHandle::new(KilnService::new(
        &KilnConfig::default(),
        MockHeater::new(),
        RecordingSink::new(),
        Instant::now(),
    ))
}

#[test]
fn idle_loop_never_touches_sensor() {
    let handle = make_handle();
    let mut lp = ControlLoop::new(MockSensor::constant(20.0), handle, Duration::from_secs(1));
    for _ in 0..5 {
        assert!(!lp.step());
    }
    assert_eq!(lp.sensor().reads, 0);
}

#[test]
fn stop_takes_effect_on_next_step() {
    let handle = make_handle();
    handle.start(1000.0, 60).unwrap();
    let mut lp = ControlLoop::new(
        MockSensor::constant(20.0),
        handle.clone(),
        Duration::from_secs(1),
    );
    assert!(lp.step());
    assert!(handle.lock().heater().is_on());

    handle.stop();
    assert!(!handle.lock().heater().is_on());
    assert!(!lp.step());
    assert_eq!(lp.sensor().reads, 1);
}

#[test]
fn sensor_loss_stops_and_clears_temperature() {
    let handle = make_handle();
    handle.start(1000.0, 60).unwrap();
    let mut lp = ControlLoop::new(
        MockSensor::scripted([Ok(20.0), Ok(21.0)], Err(SensorError::NoResponse)),
        handle.clone(),
        Duration::from_secs(1),
    );
    assert!(lp.step());
    assert!(lp.step());
    assert_eq!(handle.status().current_temperature, Some(21.0));

    assert!(lp.step());
    let status = handle.status();
    assert!(!status.running);
    assert!(!status.heater_on);
    assert_eq!(status.current_temperature, None);
    assert_eq!(
        handle
            .lock()
            .sink()
            .count(|e| matches!(e, KilnEvent::SensorFault(_))),
        1
    );
}

#[test]
fn threaded_loop_controls_and_shuts_down_cleanly() {
    let handle = make_handle();
    handle.start(1000.0, 60).unwrap();
    let running = ControlLoop::new(
        MockSensor::constant(20.0),
        handle.clone(),
        Duration::from_millis(10),
    )
    .spawn()
    .unwrap();

    thread::sleep(Duration::from_millis(100));
    // Commands and status stay responsive while the loop runs.
    let status = handle.status();
    assert!(status.running);
    assert!(status.heater_on);

    let sensor = running.stop().expect("loop thread exits normally");
    assert!(sensor.reads >= 2, "only {} reads", sensor.reads);

    handle.shutdown();
    assert!(!handle.lock().heater().is_on());
}

#[test]
fn crashing_sensor_driver_stops_firing_and_opens_relay() {
    let handle = make_handle();
    handle.start(1000.0, 3600).unwrap();
    let running = ControlLoop::new(
        PanickingSensor::after(1, 20.0),
        handle.clone(),
        Duration::from_millis(10),
    )
    .spawn()
    .unwrap();

    thread::sleep(Duration::from_millis(200));
    let status = handle.status();
    assert!(!status.running);
    assert!(!status.heater_on);
    assert_eq!(status.current_temperature, None);
    assert!(!handle.lock().heater().is_on());
    assert_eq!(
        handle
            .lock()
            .sink()
            .count(|e| *e == KilnEvent::SensorFault(SensorError::Panicked)),
        1
    );

    // Idle afterwards, so the broken driver is not read again.
    let sensor = running.stop().expect("loop thread survives the panic");
    assert_eq!(sensor.reads, 2);
}
