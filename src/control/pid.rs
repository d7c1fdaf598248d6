//! PID controller for heater demand
//!
//! Proportional-integral-derivative controller mapping kiln temperature
//! error to a heater demand in `[0, 1]`.  The period `dt` is fixed at
//! construction (one control tick).
//!
//! The integral accumulates without bound while the output is saturated
//! unless anti-windup is enabled.

/// Output bounds are fixed: 0 = heater fully off, 1 = fully on.
pub const OUTPUT_MIN: f32 = 0.0;
pub const OUTPUT_MAX: f32 = 1.0;

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    dt: f32,
    setpoint: f32,
    integral: f32,
    prev_error: f32,
    anti_windup: bool,
}

impl PidController {
    pub fn new(kp: f32, ki: f32, kd: f32, dt: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            dt,
            setpoint: 0.0,
            integral: 0.0,
            prev_error: 0.0,
            anti_windup: false,
        }
    }

    /// Enable or disable conditional integration.
    pub fn with_anti_windup(mut self, enabled: bool) -> Self {
        self.anti_windup = enabled;
        self
    }

    /// Update setpoint.  Takes effect on the next [`compute`](Self::compute).
    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Accumulated integral term (error × seconds).
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Compute PID output given current measurement.
    pub fn compute(&mut self, measured: f32) -> f32 {
        let error = self.setpoint - measured;
        let dt = self.dt;

        // Proportional
        let p = self.kp * error;

        // Integral
        self.integral += error * dt;
        let i = self.ki * self.integral;

        // Derivative
        let derivative = if dt > 0.0 {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        let d = self.kd * derivative;

        self.prev_error = error;

        let raw = p + i + d;
        // NaN inputs must not escape the bounds.
        let output = if raw.is_nan() {
            OUTPUT_MIN
        } else {
            raw.clamp(OUTPUT_MIN, OUTPUT_MAX)
        };

        // Anti-windup: if output is saturated, stop integrating
        if self.anti_windup && (output >= OUTPUT_MAX || output <= OUTPUT_MIN) {
            self.integral -= error * dt;
        }

        output
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> PidController {
        PidController::new(1.0, 0.1, 0.05, 1.0)
    }

    #[test]
    fn unreachable_setpoint_saturates_high() {
        let mut pid = reference();
        pid.set_setpoint(1000.0);
        for _ in 0..10 {
            assert!((pid.compute(20.0) - OUTPUT_MAX).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn at_setpoint_with_zero_integral_is_off() {
        let mut pid = reference();
        pid.set_setpoint(20.0);
        assert!(pid.compute(20.0).abs() < 1e-6);
    }

    #[test]
    fn integral_winds_up_without_anti_windup() {
        let mut pid = reference();
        pid.set_setpoint(1000.0);
        for _ in 0..10 {
            pid.compute(20.0);
        }
        assert!((pid.integral() - 9800.0).abs() < 0.5);
    }

    #[test]
    fn anti_windup_freezes_integral_while_saturated() {
        let mut pid = reference().with_anti_windup(true);
        pid.set_setpoint(1000.0);
        for _ in 0..10 {
            pid.compute(20.0);
        }
        assert!(pid.integral().abs() < 1e-3);
    }

    #[test]
    fn matches_textbook_terms() {
        // error = 2, integral = 2, derivative = 2 (prev_error starts at 0)
        let mut pid = PidController::new(0.1, 0.05, 0.02, 1.0);
        pid.set_setpoint(12.0);
        let out = pid.compute(10.0);
        assert!((out - (0.2 + 0.1 + 0.04)).abs() < 1e-6);
    }

    #[test]
    fn setpoint_change_applies_next_call() {
        let mut pid = reference();
        pid.set_setpoint(20.0);
        assert!(pid.compute(20.0) < 0.01);
        pid.set_setpoint(500.0);
        assert!((pid.compute(20.0) - OUTPUT_MAX).abs() < f32::EPSILON);
    }

    #[test]
    fn above_setpoint_clamps_to_zero() {
        let mut pid = reference();
        pid.set_setpoint(100.0);
        assert!(pid.compute(400.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reset_clears_state() {
        let mut pid = reference();
        pid.set_setpoint(50.0);
        pid.compute(10.0);
        pid.reset();
        assert!(pid.integral().abs() < f32::EPSILON);
    }
}
