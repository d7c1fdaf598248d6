//! Unified error types for the kiln controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the session state machine and event sink without
//! allocation.
//!
//! Propagation rules:
//!
//! - [`SensorError`] never leaves the control loop; it forces a fail-safe
//!   stop and shows up only as a log entry and an absent temperature.
//! - [`ActuatorError`] forces the in-memory heater command to OFF and is
//!   logged; it never aborts the loop.
//! - [`CommandError`] is returned to the caller of `start()`.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The thermocouple could not be read or returned implausible data.
    Sensor(SensorError),
    /// The heater relay could not be driven.
    Actuator(ActuatorError),
    /// A start command carried invalid parameters.
    Command(CommandError),
    /// Hardware acquisition failed at startup.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Fault flags reported by the MAX31855 in bits 0..2 of its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThermocoupleFault {
    pub open_circuit: bool,
    pub short_to_gnd: bool,
    pub short_to_vcc: bool,
}

impl fmt::Display for ThermocoupleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (set, name) in [
            (self.open_circuit, "open circuit"),
            (self.short_to_gnd, "short to GND"),
            (self.short_to_vcc, "short to VCC"),
        ] {
            if set {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "unspecified fault")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A GPIO operation failed during the bit-banged transaction.
    Bus,
    /// The data line never pulled low (all-ones frame): chip absent.
    NoResponse,
    /// The chip reported a thermocouple fault.
    Fault(ThermocoupleFault),
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// The read or the control step panicked; no trustworthy sample exists.
    Panicked,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transaction failed"),
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::Fault(flags) => write!(f, "thermocouple fault ({flags})"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Panicked => write!(f, "control step panicked"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// A start command was rejected.  Never affects a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Setpoint missing, non-numeric, or not finite.
    InvalidSetpoint,
    /// Hold time missing, negative, or not an integer.
    InvalidHoldTime,
    /// Payload is not an object.
    Malformed,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetpoint => write!(f, "set_point must be a finite number"),
            Self::InvalidHoldTime => write!(f, "hold_time must be a non-negative integer"),
            Self::Malformed => write!(f, "malformed command payload"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
