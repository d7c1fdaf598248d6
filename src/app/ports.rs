//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ KilnService (domain)
//! ```
//!
//! Driven adapters (thermocouple, relay, event sinks, config storage)
//! implement these traits.  The [`KilnService`](super::service::KilnService)
//! and [`ControlLoop`](super::control_loop::ControlLoop) consume them via
//! generics, so the domain core never touches GPIO directly.

use crate::config::KilnConfig;
use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one calibrated temperature sample per call.
///
/// Implementations must not retry internally and must never panic on a
/// hardware fault; every failure becomes a [`SensorError`].
pub trait SensorPort {
    /// Read the kiln temperature in °C.
    fn read(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Heater port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the physical relay/GPIO primitive.
pub trait HeaterPort {
    /// Energise (`true`) or release (`false`) the heating element.
    fn set(&mut self, on: bool) -> Result<(), ActuatorError>;
}

impl<T: HeaterPort + ?Sized> HeaterPort for Box<T> {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        (**self).set(on)
    }
}

impl<T: SensorPort + ?Sized> SensorPort for Box<T> {
    fn read(&mut self) -> Result<f32, SensorError> {
        (**self).read()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`KilnEvent`](super::events::KilnEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::KilnEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`KilnConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<KilnConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &KilnConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
