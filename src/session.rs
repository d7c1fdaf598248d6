//! Kiln session: the firing lifecycle on top of the session FSM.
//!
//! A session is created once at startup in `Idle`.  Every start command
//! re-initialises set point, hold time, and start time; a stop command or
//! a sensor fault ends the firing and freezes the elapsed clock.
//!
//! Time is always passed in by the caller, so the whole lifecycle can be
//! driven deterministically in tests.

use std::time::{Duration, Instant};

use log::info;

use crate::app::commands::StartCommand;
use crate::error::SensorError;
use crate::fsm::context::SessionContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

pub struct KilnSession {
    fsm: Fsm,
    ctx: SessionContext,
}

impl KilnSession {
    pub fn new(now: Instant, stop_on_hold_expiry: bool) -> Self {
        let mut ctx = SessionContext::new(now, stop_on_hold_expiry);
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Begin a firing.  Starting while already running restarts the
    /// firing with the new parameters and a fresh clock.
    pub fn start(&mut self, cmd: StartCommand, now: Instant) {
        self.ctx.now = now;
        if self.is_running() {
            info!("Restarting firing with new parameters");
            self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        }
        self.ctx.setpoint = cmd.setpoint;
        self.ctx.hold_secs = cmd.hold_secs;
        self.ctx.started_at = Some(now);
        self.ctx.stopped_at = None;
        self.fsm.force_transition(StateId::Running, &mut self.ctx);
    }

    /// End the firing.  Returns whether a firing was in progress.
    pub fn stop(&mut self, now: Instant) -> bool {
        self.ctx.now = now;
        let was_running = self.is_running();
        if was_running {
            self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        }
        was_running
    }

    /// Sensor loss: Running → Faulted → Idle within a single call.
    pub fn fault(&mut self, err: SensorError, now: Instant) {
        self.ctx.now = now;
        if !self.is_running() {
            return;
        }
        self.ctx.last_fault = Some(err);
        self.fsm.force_transition(StateId::Faulted, &mut self.ctx);
        self.fsm.tick(&mut self.ctx);
    }

    /// Per-tick bookkeeping.  Returns the state after the tick.
    pub fn advance(&mut self, now: Instant) -> StateId {
        self.ctx.now = now;
        self.fsm.tick(&mut self.ctx);
        self.fsm.current_state()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_running(&self) -> bool {
        self.fsm.current_state() == StateId::Running
    }

    pub fn setpoint(&self) -> f32 {
        self.ctx.setpoint
    }

    pub fn hold_secs(&self) -> u64 {
        self.ctx.hold_secs
    }

    /// Live while running, frozen at the stop time afterwards.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.ctx.elapsed(now)
    }

    pub fn hold_expired(&self, now: Instant) -> bool {
        self.ctx.hold_expired(now)
    }

    /// The sensor error that ended the most recent firing, if any.
    pub fn last_fault(&self) -> Option<SensorError> {
        self.ctx.last_fault
    }
}
