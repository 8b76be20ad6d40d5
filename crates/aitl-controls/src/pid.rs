//! PID controller used as the inner loop.
//!
//! The control law is the textbook parallel form with no output clamping or
//! derivative filtering:
//!
//! ```text
//! integral   += e * dt
//! derivative  = (e - e_prev) / dt
//! u           = kp * e + ki * integral + kd * derivative
//! ```
//!
//! Gains are kept in a separate [`PidGains`] value so the tuning layer can be
//! handed a mutable gains handle without touching the controller memory.

use crate::error::{ControlResult, ensure_positive_dt};
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
}

impl PidGains {
    /// Create a gain set.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Gains as a `(kp, ki, kd)` tuple.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }
}

impl From<(f64, f64, f64)> for PidGains {
    fn from((kp, ki, kd): (f64, f64, f64)) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID controller with integrator and previous-error memory.
///
/// Only [`PidGains`] is serializable; controller memory is runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct Pid {
    gains: PidGains,
    integral: f64,
    prev_error: f64,
}

impl Pid {
    /// Create a new PID controller with zeroed memory.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_gains(PidGains::new(kp, ki, kd))
    }

    /// Create a new PID controller from a gain set.
    pub fn with_gains(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Compute the control output for a given error.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidArg`](crate::ControlError::InvalidArg) if
    /// `dt` is not positive. The controller memory is left untouched in that case.
    pub fn update(&mut self, error: f64, dt: f64) -> ControlResult<f64> {
        let dt = ensure_positive_dt(dt)?;

        self.integral += error * dt;
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        let PidGains { kp, ki, kd } = self.gains;
        Ok(kp * error + ki * self.integral + kd * derivative)
    }

    /// Compute the control output from a setpoint and a measurement.
    ///
    /// Error convention: `e = sp - pv` (positive error means the measurement is
    /// below the setpoint).
    pub fn update_setpoint(&mut self, setpoint: f64, measurement: f64, dt: f64) -> ControlResult<f64> {
        self.update(setpoint - measurement, dt)
    }

    /// Clear the integral and derivative memory. Gains are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Snapshot of the current gains as `(kp, ki, kd)`.
    pub fn gains(&self) -> (f64, f64, f64) {
        self.gains.as_tuple()
    }

    /// Current gain set.
    pub fn gain_set(&self) -> PidGains {
        self.gains
    }

    /// Mutable handle on the gains, used by the tuning layer.
    pub fn gains_mut(&mut self) -> &mut PidGains {
        &mut self.gains
    }

    /// Integral accumulator.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error seen on the previous update.
    pub fn previous_error(&self) -> f64 {
        self.prev_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlError;

    #[test]
    fn integral_growth_raises_output() {
        let mut pid = Pid::new(1.0, 0.1, 0.01);
        let u1 = pid.update(1.0, 0.1).unwrap();
        let u2 = pid.update(1.0, 0.1).unwrap();
        assert!(u2 > u1);
    }

    #[test]
    fn first_update_matches_law() {
        let mut pid = Pid::new(2.0, 0.5, 0.1);
        let u = pid.update(1.0, 0.1).unwrap();
        // P = 2.0, I = 0.5 * 0.1, D = 0.1 * (1.0 / 0.1)
        assert!((u - (2.0 + 0.05 + 1.0)).abs() < 1e-12);
        assert!((pid.integral() - 0.1).abs() < 1e-12);
        assert_eq!(pid.previous_error(), 1.0);
    }

    #[test]
    fn derivative_term_contributes() {
        let mut pid = Pid::new(1.0, 0.1, 0.01);
        pid.update(1.0, 0.1).unwrap();
        let u = pid.update(2.0, 0.1).unwrap();
        assert!(u > 0.1);
    }

    #[test]
    fn reset_clears_memory_only() {
        let mut pid = Pid::new(1.0, 0.1, 0.01);
        pid.update(1.0, 0.1).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
        assert_eq!(pid.gains(), (1.0, 0.1, 0.01));
    }

    #[test]
    fn setpoint_form_matches_error_form() {
        let mut a = Pid::new(1.2, 0.5, 0.1);
        let mut b = a.clone();
        for pv in [0.0, 0.4, 0.9, 1.3] {
            let ua = a.update_setpoint(1.0, pv, 0.01).unwrap();
            let ub = b.update(1.0 - pv, 0.01).unwrap();
            assert_eq!(ua, ub);
        }
    }

    #[test]
    fn invalid_dt_leaves_memory() {
        let mut pid = Pid::new(1.0, 0.1, 0.01);
        pid.update(0.5, 0.1).unwrap();
        let before = pid.clone();

        assert_eq!(
            pid.update(1.0, 0.0),
            Err(ControlError::InvalidArg {
                what: "dt must be positive"
            })
        );
        assert!(pid.update(1.0, -0.1).is_err());
        assert_eq!(pid, before);
    }
}
