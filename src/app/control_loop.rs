//! Cadence-driven control loop.
//!
//! One dedicated thread owns the [`SensorPort`] and runs a fixed-rate
//! schedule: read the sensor (outside the service lock), then lock the
//! [`KilnHandle`] and run one [`KilnService::tick`](super::service::KilnService::tick).
//! While idle the sensor is not read at all.
//!
//! ```text
//!   ┌─ next += interval ◀─────────────────────────────┐
//!   │                                                  │
//!   ▼                                                  │
//!  running? ──no──────────────────────────────┐        │
//!   │ yes                                      ▼        │
//!  sensor.read() ──▶ handle.tick(sample) ──▶ wait until next / shutdown
//! ```
//!
//! A panic inside a step is caught and treated like a failed read: the
//! firing is faulted and the heater forced off before the loop carries on
//! with the next cadence boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::ports::{EventSink, HeaterPort, SensorPort};
use super::service::KilnHandle;
use crate::error::Error;

pub struct ControlLoop<S: SensorPort, H: HeaterPort, E: EventSink> {
    sensor: S,
    handle: KilnHandle<H, E>,
    interval: Duration,
}

impl<S: SensorPort, H: HeaterPort, E: EventSink> ControlLoop<S, H, E> {
    pub fn new(sensor: S, handle: KilnHandle<H, E>, interval: Duration) -> Self {
        Self {
            sensor,
            handle,
            interval,
        }
    }

    /// One loop body.  Returns `true` when the sensor was sampled.
    pub fn step(&mut self) -> bool {
        if !self.handle.is_running() {
            return false;
        }
        let sample = self.sensor.read();
        self.handle.tick(sample);
        true
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Run until `shutdown` fires or its sender is dropped.
    pub fn run(mut self, shutdown: mpsc::Receiver<()>) -> S {
        info!(
            "Control loop running every {} ms",
            self.interval.as_millis()
        );
        let mut next = Instant::now();

        loop {
            next += self.interval;

            if panic::catch_unwind(AssertUnwindSafe(|| self.step())).is_err() {
                error!("Error in control loop: step panicked, forcing heater off");
                self.handle.abort_tick();
            }

            let now = Instant::now();
            let wait = next.saturating_duration_since(now);
            if wait.is_zero() {
                warn!("Control tick overran its {:?} period", self.interval);
                next = now;
            }

            match shutdown.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("Control loop stopped");
        self.sensor
    }
}

impl<S, H, E> ControlLoop<S, H, E>
where
    S: SensorPort + Send + 'static,
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    /// Move the loop onto its own named thread.
    pub fn spawn(self) -> Result<LoopHandle<S>, Error> {
        let (tx, rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("control-loop".into())
            .spawn(move || self.run(rx))
            .map_err(|_| Error::Init("control loop thread"))?;
        Ok(LoopHandle { shutdown: tx, join })
    }
}

/// Owner-side handle to a spawned [`ControlLoop`].
pub struct LoopHandle<S> {
    shutdown: Sender<()>,
    join: JoinHandle<S>,
}

impl<S> LoopHandle<S> {
    /// Signal the loop, wait for the current tick to finish, and take
    /// the sensor back.  `None` if the thread itself died.
    pub fn stop(self) -> Option<S> {
        let _ = self.shutdown.send(());
        match self.join.join() {
            Ok(sensor) => Some(sensor),
            Err(_) => {
                error!("Control loop thread panicked");
                None
            }
        }
    }
}
