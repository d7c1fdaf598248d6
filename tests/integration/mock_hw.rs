//! Mock hardware adapters for integration tests.
//!
//! Records every heater write and every emitted event so tests can assert
//! on the full history without touching real GPIO.

use std::collections::VecDeque;

use kilnctl::app::events::KilnEvent;
use kilnctl::app::ports::{EventSink, HeaterPort, SensorPort};
use kilnctl::error::{ActuatorError, SensorError};

// ── MockHeater ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHeater {
    pub writes: Vec<bool>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockHeater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of the last successful write (relay starts open).
    pub fn is_on(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }
}

impl HeaterPort for MockHeater {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.writes.push(on);
        Ok(())
    }
}

// ── MockSensor ────────────────────────────────────────────────

/// Replays a script of samples, then repeats `fallback`.
#[derive(Debug)]
pub struct MockSensor {
    pub script: VecDeque<Result<f32, SensorError>>,
    pub fallback: Result<f32, SensorError>,
    pub reads: usize,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn constant(temp: f32) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Ok(temp),
            reads: 0,
        }
    }

    pub fn scripted(
        samples: impl IntoIterator<Item = Result<f32, SensorError>>,
        fallback: Result<f32, SensorError>,
    ) -> Self {
        Self {
            script: samples.into_iter().collect(),
            fallback,
            reads: 0,
        }
    }
}

impl SensorPort for MockSensor {
    fn read(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

/// Returns `good` readings, then panics on every later read.
#[derive(Debug)]
pub struct PanickingSensor {
    pub good: usize,
    pub temp: f32,
    pub reads: usize,
}

#[allow(dead_code)]
impl PanickingSensor {
    pub fn after(good: usize, temp: f32) -> Self {
        Self {
            good,
            temp,
            reads: 0,
        }
    }
}

impl SensorPort for PanickingSensor {
    fn read(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        if self.reads > self.good {
            panic!("thermocouple driver crashed on read {}", self.reads);
        }
        Ok(self.temp)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<KilnEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&KilnEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &KilnEvent) {
        self.events.push(event.clone());
    }
}
