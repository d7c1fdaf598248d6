//! Integration tests for the KilnService tick pipeline:
//! sample → session → filter → PID → hysteresis → heater.

use std::time::{Duration, Instant};

use crate::mock_hw::{MockHeater, RecordingSink};

use kilnctl::app::commands::{KilnCommand, StartCommand};
use kilnctl::app::events::KilnEvent;
use kilnctl::app::service::KilnService;
use kilnctl::config::KilnConfig;
use kilnctl::control::hysteresis::HeaterCommand;
use kilnctl::error::{CommandError, SensorError, ThermocoupleFault};
use kilnctl::fsm::StateId;

fn make_service(config: &KilnConfig) -> (KilnService<MockHeater, RecordingSink>, Instant) {
    let t0 = Instant::now();
    let svc = KilnService::new(config, MockHeater::new(), RecordingSink::new(), t0);
    (svc, t0)
}

fn secs(t0: Instant, s: u64) -> Instant {
    t0 + Duration::from_secs(s)
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn unreachable_setpoint_saturates_and_heater_stays_on() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(1000.0, 3600, t0).unwrap();

    for i in 1..=10 {
        svc.tick(Ok(20.0), secs(t0, i));
        let status = svc.status(secs(t0, i));
        assert_eq!(status.control_output, Some(1.0), "tick {i}");
        assert!(status.heater_on, "tick {i}");
    }
    // One OFF on construction, one OFF at start, then ON every tick.
    assert!(svc.heater().is_on());
    assert_eq!(
        svc.sink()
            .count(|e| matches!(e, KilnEvent::HeaterSwitched(HeaterCommand::On))),
        1
    );
}

#[test]
fn measured_at_setpoint_keeps_heater_off() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(20.0, 600, t0).unwrap();
    svc.tick(Ok(20.0), secs(t0, 1));
    let status = svc.status(secs(t0, 1));
    assert!(status.control_output.unwrap().abs() < 1e-6);
    assert!(!status.heater_on);
    assert!(!svc.heater().is_on());
}

#[test]
fn sensor_failure_is_fail_safe_in_one_tick() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(1000.0, 600, t0).unwrap();
    svc.tick(Ok(25.0), secs(t0, 1));
    assert!(svc.heater().is_on());

    let fault = SensorError::Fault(ThermocoupleFault {
        open_circuit: true,
        ..ThermocoupleFault::default()
    });
    svc.tick(Err(fault), secs(t0, 2));

    let status = svc.status(secs(t0, 2));
    assert!(!status.running);
    assert_eq!(status.state, StateId::Idle);
    assert!(!status.heater_on);
    assert_eq!(status.current_temperature, None);
    assert!(!svc.heater().is_on());
    assert_eq!(svc.session().last_fault(), Some(fault));

    // Nothing moves until the next start.
    let integral = svc.pid().integral();
    svc.tick(Ok(25.0), secs(t0, 3));
    assert_eq!(svc.pid().integral(), integral);
    assert_eq!(svc.filter().len(), 1);
}

#[test]
fn invalid_start_is_rejected_and_changes_nothing() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(300.0, 120, t0).unwrap();
    svc.tick(Ok(100.0), secs(t0, 1));
    let before = svc.status(secs(t0, 1));

    assert_eq!(
        svc.start(f32::NAN, 100, secs(t0, 1)),
        Err(CommandError::InvalidSetpoint)
    );
    assert_eq!(
        svc.start(200.0, -1, secs(t0, 1)),
        Err(CommandError::InvalidHoldTime)
    );
    assert_eq!(svc.status(secs(t0, 1)), before);
    assert_eq!(
        svc.sink().count(|e| matches!(e, KilnEvent::Started { .. })),
        1
    );
}

#[test]
fn start_then_stop_freezes_elapsed() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(100.0, 3600, t0).unwrap();
    svc.stop(t0 + Duration::from_millis(250));

    let a = svc.status(secs(t0, 1));
    let b = svc.status(secs(t0, 60));
    assert!(!a.running);
    assert!((a.elapsed_time - 0.25).abs() < 1e-9);
    assert_eq!(a.elapsed_time, b.elapsed_time);
    assert_eq!(a.hold_time_total, 3600);
    assert_eq!(a.set_point, 100.0);
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn elapsed_advances_only_while_running() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    assert_eq!(svc.status(secs(t0, 5)).elapsed_time, 0.0);
    svc.start(100.0, 60, secs(t0, 5)).unwrap();
    assert_eq!(svc.status(secs(t0, 15)).elapsed_time, 10.0);
    assert_eq!(svc.status(secs(t0, 25)).elapsed_time, 20.0);
}

#[test]
fn filter_and_pid_persist_across_firings() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(100.0, 60, t0).unwrap();
    svc.tick(Ok(50.0), secs(t0, 1));
    svc.tick(Ok(60.0), secs(t0, 2));
    svc.stop(secs(t0, 3));
    let integral = svc.pid().integral();

    svc.start(100.0, 60, secs(t0, 4)).unwrap();
    assert_eq!(svc.pid().integral(), integral);
    assert_eq!(svc.filter().len(), 2);
    svc.tick(Ok(70.0), secs(t0, 5));
    assert_eq!(svc.status(secs(t0, 5)).smoothed_temperature, Some(60.0));
}

#[test]
fn handle_command_dispatches_start_and_stop() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    let start = StartCommand::new(850.0, 900).unwrap();
    svc.handle_command(KilnCommand::Start(start), t0);
    assert_eq!(svc.state(), StateId::Running);
    assert_eq!(svc.pid().setpoint(), 850.0);
    svc.handle_command(KilnCommand::Stop, secs(t0, 1));
    assert_eq!(svc.state(), StateId::Idle);
}

#[test]
fn setpoint_change_takes_effect_next_tick() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(1000.0, 60, t0).unwrap();
    svc.tick(Ok(20.0), secs(t0, 1));
    assert!(svc.heater().is_on());

    // Restart well below the current temperature.
    svc.start(0.0, 60, secs(t0, 2)).unwrap();
    assert!(!svc.heater().is_on(), "every firing starts with the relay open");
    svc.tick(Ok(500.0), secs(t0, 3));
    assert_eq!(svc.heater_command(), HeaterCommand::Off);
}

#[test]
fn relay_failure_forces_command_off_and_keeps_running() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(1000.0, 60, t0).unwrap();
    svc.heater_mut().fail_writes = true;
    svc.tick(Ok(20.0), secs(t0, 1));

    assert!(svc.is_running());
    assert_eq!(svc.heater_command(), HeaterCommand::Off);
    assert!(svc.sink().count(|e| matches!(e, KilnEvent::HeaterFault(_))) >= 1);
}

#[test]
fn hold_completion_is_opt_in() {
    let config = KilnConfig {
        stop_on_hold_expiry: true,
        ..KilnConfig::default()
    };
    let (mut svc, t0) = make_service(&config);
    svc.start(1000.0, 5, t0).unwrap();
    for i in 1..=4 {
        svc.tick(Ok(20.0), secs(t0, i));
    }
    assert!(svc.is_running());
    svc.tick(Ok(20.0), secs(t0, 5));
    assert!(!svc.is_running());
    assert!(!svc.heater().is_on());
    assert_eq!(
        svc.sink().count(|e| matches!(e, KilnEvent::Stopped { .. })),
        1
    );
    assert_eq!(svc.status(secs(t0, 30)).elapsed_time, 5.0);
}

#[test]
fn shutdown_releases_heater() {
    let (mut svc, t0) = make_service(&KilnConfig::default());
    svc.start(1000.0, 60, t0).unwrap();
    svc.tick(Ok(20.0), secs(t0, 1));
    svc.shutdown(secs(t0, 2));
    assert!(!svc.is_running());
    assert_eq!(svc.heater().writes.last(), Some(&false));
}
