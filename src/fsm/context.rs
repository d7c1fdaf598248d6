//! Shared mutable context threaded through every FSM handler.
//!
//! `SessionContext` holds the firing parameters (setpoint, hold time),
//! the run clock, and the fault that ended the last firing.  State handlers
//! read and write it; [`KilnSession`](crate::session::KilnSession) owns it.

use std::time::{Duration, Instant};

use crate::error::SensorError;

pub struct SessionContext {
    // -- Timing --
    /// Time of the event being processed.  Set before every FSM call.
    pub now: Instant,

    // -- Firing parameters --
    /// Target temperature (°C).
    pub setpoint: f32,
    /// Requested hold duration (seconds).
    pub hold_secs: u64,
    /// Start of the current or most recent firing.
    pub started_at: Option<Instant>,
    /// End of the most recent firing; `None` while running.
    pub stopped_at: Option<Instant>,

    // -- Outputs --
    /// Most recent sensor failure that ended a firing.
    pub last_fault: Option<SensorError>,

    // -- Policy --
    /// End the firing once the hold time has elapsed.
    pub stop_on_hold_expiry: bool,
}

impl SessionContext {
    pub fn new(now: Instant, stop_on_hold_expiry: bool) -> Self {
        Self {
            now,
            setpoint: 0.0,
            hold_secs: 0,
            started_at: None,
            stopped_at: None,
            last_fault: None,
            stop_on_hold_expiry,
        }
    }

    /// Time spent firing: live while running, frozen after a stop.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), None) => now.saturating_duration_since(start),
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (None, _) => Duration::ZERO,
        }
    }

    /// True once a started firing has run for at least its hold time.
    pub fn hold_expired(&self, now: Instant) -> bool {
        self.started_at.is_some() && self.elapsed(now) >= Duration::from_secs(self.hold_secs)
    }
}
