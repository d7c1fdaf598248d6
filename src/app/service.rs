//! Application service: the hexagonal core.
//!
//! [`KilnService`] owns the session, the smoothing filter, the PID
//! controller and the hysteresis actuator.  It is the single owned object
//! that both the control loop and the command surface mutate, always
//! through one lock held by a [`KilnHandle`].
//!
//! ```text
//!  sample ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!             │         KilnService          │
//!  HeaterPort ◀│ Session · Filter · PID · Hys │◀── start / stop / status
//!             └─────────────────────────────┘
//! ```
//!
//! The sensor is deliberately *not* owned here: the control loop reads it
//! outside the lock and hands the result to [`KilnService::tick`], so a
//! slow bit-banged read never blocks a status request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::config::{ControlInput, KilnConfig};
use crate::control::filter::SmoothingFilter;
use crate::control::hysteresis::{HeaterCommand, HysteresisActuator};
use crate::control::pid::PidController;
use crate::error::{CommandError, SensorError};
use crate::fsm::StateId;
use crate::session::KilnSession;

use super::commands::{KilnCommand, StartCommand};
use super::events::{KilnEvent, KilnStatus};
use super::ports::{EventSink, HeaterPort};

// ───────────────────────────────────────────────────────────────
// KilnService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct KilnService<H: HeaterPort, E: EventSink> {
    session: KilnSession,
    filter: SmoothingFilter,
    pid: PidController,
    actuator: HysteresisActuator<H>,
    sink: E,
    control_input: ControlInput,

    // Last published measurements
    current_temperature: Option<f32>,
    smoothed_temperature: Option<f32>,
    control_output: Option<f32>,

    hold_expiry_reported: bool,
    telemetry_every: u64,
    ticks_since_telemetry: u64,
}

impl<H: HeaterPort, E: EventSink> KilnService<H, E> {
    /// Construct the service in `Idle` with the heater forced off.
    pub fn new(config: &KilnConfig, heater: H, sink: E, now: Instant) -> Self {
        let pid = PidController::new(config.kp, config.ki, config.kd, config.tick_secs())
            .with_anti_windup(config.anti_windup);
        let mut actuator = HysteresisActuator::new(
            heater,
            config.heater_off_threshold,
            config.heater_on_threshold,
        );
        if let Err(e) = actuator.force_off() {
            error!("Initial heater OFF failed: {e}");
        }

        let interval_ms = u64::from(config.control_loop_interval_ms.max(1));
        let telemetry_every =
            (u64::from(config.telemetry_interval_secs) * 1000 / interval_ms).max(1);

        Self {
            session: KilnSession::new(now, config.stop_on_hold_expiry),
            filter: SmoothingFilter::new(),
            pid,
            actuator,
            sink,
            control_input: config.control_input,
            current_temperature: None,
            smoothed_temperature: None,
            control_output: None,
            hold_expiry_reported: false,
            telemetry_every,
            ticks_since_telemetry: 0,
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Validate and begin a firing.  On error nothing changes.
    pub fn start(
        &mut self,
        setpoint: f32,
        hold_seconds: i64,
        now: Instant,
    ) -> Result<(), CommandError> {
        match StartCommand::new(setpoint, hold_seconds) {
            Ok(cmd) => {
                self.begin(cmd, now);
                Ok(())
            }
            Err(e) => {
                error!("Error starting kiln: {e}");
                Err(e)
            }
        }
    }

    /// End the firing and force the heater off.  Always succeeds; a failed
    /// relay write is logged and reported as an event only.
    pub fn stop(&mut self, now: Instant) {
        let was_running = self.session.stop(now);
        self.release_heater();
        if was_running {
            self.clear_measurements();
            let elapsed_secs = self.session.elapsed(now).as_secs_f64();
            info!("Kiln stopped after {elapsed_secs:.1}s");
            self.sink.emit(&KilnEvent::Stopped { elapsed_secs });
        } else {
            info!("Kiln stopped (was idle)");
        }
    }

    /// Process an external command.
    pub fn handle_command(&mut self, cmd: KilnCommand, now: Instant) {
        match cmd {
            KilnCommand::Start(start) => self.begin(start, now),
            KilnCommand::Stop => self.stop(now),
        }
    }

    /// Stop any firing and release the heater.  Called on every exit path.
    pub fn shutdown(&mut self, now: Instant) {
        info!("Shutting down...");
        self.stop(now);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control step with a sample the caller has already read.
    ///
    /// No-op while idle.  A sensor error ends the firing in this same call:
    /// the session returns to `Idle`, the heater is forced off, and the
    /// published temperature is cleared.
    pub fn tick(&mut self, sample: Result<f32, SensorError>, now: Instant) {
        if !self.session.is_running() {
            return;
        }

        let measured = match sample {
            Ok(t) => t,
            Err(e) => {
                self.fail_safe(e, now);
                return;
            }
        };
        self.current_temperature = Some(measured);

        // 1. Session bookkeeping (hold expiry, optional completion)
        if self.session.advance(now) != StateId::Running {
            self.hold_expiry_reported = true;
            self.sink.emit(&KilnEvent::HoldExpired {
                hold_secs: self.session.hold_secs(),
            });
            self.release_heater();
            self.clear_measurements();
            let elapsed_secs = self.session.elapsed(now).as_secs_f64();
            info!("Firing complete after {elapsed_secs:.1}s");
            self.sink.emit(&KilnEvent::Stopped { elapsed_secs });
            return;
        }
        if !self.hold_expiry_reported && self.session.hold_expired(now) {
            self.hold_expiry_reported = true;
            info!("Hold time of {}s reached", self.session.hold_secs());
            self.sink.emit(&KilnEvent::HoldExpired {
                hold_secs: self.session.hold_secs(),
            });
        }

        // 2. Smoothing
        let smoothed = self.filter.add(measured);
        self.smoothed_temperature = Some(smoothed);

        // 3. PID
        let input = match self.control_input {
            ControlInput::Raw => measured,
            ControlInput::Smoothed => smoothed,
        };
        let output = self.pid.compute(input);
        self.control_output = Some(output);
        debug!("Control loop output: {output:.3} (input {input:.2}\u{00b0}C)");

        // 4. Relay
        let prev = self.actuator.command();
        let cmd = self.actuator.drive(output);
        if let Some(e) = self.actuator.last_error() {
            self.sink.emit(&KilnEvent::HeaterFault(e));
        }
        if cmd != prev {
            self.sink.emit(&KilnEvent::HeaterSwitched(cmd));
        }

        // 5. Telemetry
        self.ticks_since_telemetry += 1;
        if self.ticks_since_telemetry >= self.telemetry_every {
            self.ticks_since_telemetry = 0;
            let status = self.status(now);
            self.sink.emit(&KilnEvent::Telemetry(status));
        }
    }

    /// Fail-safe stop after a control step died without producing a
    /// result.  Same path as a failed sensor read.
    pub fn abort_tick(&mut self, now: Instant) {
        if !self.session.is_running() {
            self.release_heater();
            return;
        }
        self.fail_safe(SensorError::Panicked, now);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot.  Elapsed time is computed at `now`.
    pub fn status(&self, now: Instant) -> KilnStatus {
        KilnStatus {
            state: self.session.state(),
            running: self.session.is_running(),
            current_temperature: self.current_temperature,
            smoothed_temperature: self.smoothed_temperature,
            set_point: self.session.setpoint(),
            hold_time_total: self.session.hold_secs(),
            elapsed_time: self.session.elapsed(now).as_secs_f64(),
            heater_on: self.actuator.command().is_on(),
            control_output: self.control_output,
            hold_expired: self.session.hold_expired(now),
        }
    }

    pub fn state(&self) -> StateId {
        self.session.state()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn heater_command(&self) -> HeaterCommand {
        self.actuator.command()
    }

    pub fn session(&self) -> &KilnSession {
        &self.session
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn filter(&self) -> &SmoothingFilter {
        &self.filter
    }

    pub fn heater(&self) -> &H {
        self.actuator.driver()
    }

    pub fn heater_mut(&mut self) -> &mut H {
        self.actuator.driver_mut()
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn begin(&mut self, cmd: StartCommand, now: Instant) {
        self.session.start(cmd, now);
        self.pid.set_setpoint(cmd.setpoint);
        // Every firing starts with the relay open.
        self.release_heater();
        self.hold_expiry_reported = false;
        self.ticks_since_telemetry = 0;
        info!(
            "Kiln started with set point: {}\u{00b0}C, hold time: {} seconds",
            cmd.setpoint, cmd.hold_secs
        );
        self.sink.emit(&KilnEvent::Started {
            setpoint: cmd.setpoint,
            hold_secs: cmd.hold_secs,
        });
    }

    fn fail_safe(&mut self, err: SensorError, now: Instant) {
        error!("Error reading temperature: {err}, stopping kiln");
        self.session.fault(err, now);
        self.clear_measurements();
        self.release_heater();
        self.sink.emit(&KilnEvent::SensorFault(err));
    }

    /// Nothing is sampled between firings, so the last reading is dropped.
    fn clear_measurements(&mut self) {
        self.current_temperature = None;
        self.control_output = None;
    }

    fn release_heater(&mut self) {
        if let Err(e) = self.actuator.force_off() {
            warn!("Heater release failed: {e}");
            self.sink.emit(&KilnEvent::HeaterFault(e));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// KilnHandle
// ───────────────────────────────────────────────────────────────

/// Shared, lock-guarded handle to the service.
///
/// Cloned into the control loop thread and every request handler.  A
/// panic while the lock is held does not disable the handle: the poisoned
/// guard is recovered so stop and status keep working.
pub struct KilnHandle<H: HeaterPort, E: EventSink> {
    inner: Arc<Mutex<KilnService<H, E>>>,
}

impl<H: HeaterPort, E: EventSink> Clone for KilnHandle<H, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HeaterPort, E: EventSink> KilnHandle<H, E> {
    pub fn new(service: KilnService<H, E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Lock the service, recovering from poisoning.
    pub fn lock(&self) -> MutexGuard<'_, KilnService<H, E>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Kiln service lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn start(&self, setpoint: f32, hold_seconds: i64) -> Result<(), CommandError> {
        self.lock().start(setpoint, hold_seconds, Instant::now())
    }

    pub fn stop(&self) {
        self.lock().stop(Instant::now());
    }

    pub fn command(&self, cmd: KilnCommand) {
        self.lock().handle_command(cmd, Instant::now());
    }

    pub fn status(&self) -> KilnStatus {
        self.lock().status(Instant::now())
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    pub fn tick(&self, sample: Result<f32, SensorError>) {
        self.lock().tick(sample, Instant::now());
    }

    pub fn abort_tick(&self) {
        self.lock().abort_tick(Instant::now());
    }

    pub fn shutdown(&self) {
        self.lock().shutdown(Instant::now());
    }
}
