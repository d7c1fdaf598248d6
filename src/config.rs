//! Controller configuration parameters
//!
//! All tunable parameters for the kiln controller.
//! Values can be overridden from a JSON file (see
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile)); any
//! field left out of the file keeps its default.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Which temperature the PID acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlInput {
    /// Latest thermocouple sample.
    #[default]
    Raw,
    /// Sliding-window average of recent samples.
    Smoothed,
}

/// GPIO wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub thermo_cs: u8,
    pub thermo_clock: u8,
    pub thermo_data: u8,
    pub relay: u8,
    /// Relay board energises on a low level.
    pub relay_active_low: bool,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            thermo_cs: pins::THERMO_CS_GPIO,
            thermo_clock: pins::THERMO_CLK_GPIO,
            thermo_data: pins::THERMO_DATA_GPIO,
            relay: pins::RELAY_GPIO,
            relay_active_low: false,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    // --- PID ---
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Stop integrating while the output is saturated
    pub anti_windup: bool,

    // --- Heater hysteresis ---
    /// PID output at or above which the relay closes
    pub heater_on_threshold: f32,
    /// PID output at or below which the relay opens
    pub heater_off_threshold: f32,

    // --- Control ---
    /// Control loop period (milliseconds); also the PID `dt`
    pub control_loop_interval_ms: u32,
    /// Temperature fed to the PID
    pub control_input: ControlInput,
    /// End the firing automatically once the hold time has elapsed
    pub stop_on_hold_expiry: bool,
    /// Telemetry report interval while firing (seconds)
    pub telemetry_interval_secs: u32,

    // --- Hardware ---
    /// Calibration offset added to every thermocouple reading (°C)
    pub thermocouple_offset_c: f32,
    pub pins: PinConfig,

    // --- Command surface ---
    /// HTTP listen address
    pub bind_addr: String,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            // PID
            kp: 1.0,
            ki: 0.1,
            kd: 0.05,
            anti_windup: false,

            // Hysteresis
            heater_on_threshold: 0.6,
            heater_off_threshold: 0.4,

            // Control
            control_loop_interval_ms: 1000, // 1 Hz
            control_input: ControlInput::Raw,
            stop_on_hold_expiry: false,
            telemetry_interval_secs: 10,

            thermocouple_offset_c: 0.0,
            pins: PinConfig::default(),
            bind_addr: "0.0.0.0:5001".to_string(),
        }
    }
}

impl KilnConfig {
    /// Control period in seconds.
    pub fn tick_secs(&self) -> f32 {
        self.control_loop_interval_ms as f32 / 1000.0
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for gain in [self.kp, self.ki, self.kd] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ConfigError::ValidationFailed(
                    "PID gains must be finite and non-negative",
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.heater_on_threshold)
            || !(0.0..=1.0).contains(&self.heater_off_threshold)
        {
            return Err(ConfigError::ValidationFailed(
                "heater thresholds must be within 0.0–1.0",
            ));
        }
        if self.heater_off_threshold >= self.heater_on_threshold {
            return Err(ConfigError::ValidationFailed(
                "heater_off_threshold must be < heater_on_threshold",
            ));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be > 0",
            ));
        }
        if !self.thermocouple_offset_c.is_finite() || self.thermocouple_offset_c.abs() > 50.0 {
            return Err(ConfigError::ValidationFailed(
                "thermocouple_offset_c must be within ±50 °C",
            ));
        }
        let p = &self.pins;
        let used = [p.thermo_cs, p.thermo_clock, p.thermo_data, p.relay];
        for (i, a) in used.iter().enumerate() {
            if used[i + 1..].contains(a) {
                return Err(ConfigError::ValidationFailed("GPIO pins must be distinct"));
            }
        }
        Ok(())
    }
}
