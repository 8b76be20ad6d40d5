//! Outer gain-adaptation layer.
//!
//! The orchestrator calls the tuner only while the supervisor reports
//! [`SupervisorState::Tune`](crate::SupervisorState::Tune); the tuner itself
//! does not check the supervisor.

use crate::error::{ControlError, ControlResult, ensure_error_value};
use crate::pid::PidGains;
use serde::{Deserialize, Serialize};

/// Strategy that rescales PID gains from the tracking error.
pub trait GainTuner {
    /// Adjust `gains` in place for the current error.
    fn tune(&mut self, gains: &mut PidGains, error: f64) -> ControlResult<()>;
}

/// Multiplicative factors applied by [`RuleBasedTuner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningRates {
    /// `|e|` above this boosts the gains, otherwise they decay.
    pub error_threshold: f64,
    /// `kp` factor on large error.
    pub kp_up: f64,
    /// `kd` factor on large error.
    pub kd_up: f64,
    /// `kp` factor on small error.
    pub kp_down: f64,
    /// `kd` factor on small error.
    pub kd_down: f64,
}

impl TuningRates {
    /// Factors must be positive and the threshold non-negative.
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.error_threshold >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "tuning error_threshold must be non-negative",
            });
        }
        let factors = [self.kp_up, self.kd_up, self.kp_down, self.kd_down];
        if factors.iter().any(|f| !(*f > 0.0)) {
            return Err(ControlError::InvalidArg {
                what: "tuning factors must be positive",
            });
        }
        Ok(())
    }
}

impl Default for TuningRates {
    fn default() -> Self {
        Self {
            error_threshold: 0.5,
            kp_up: 1.02,
            kd_up: 1.01,
            kp_down: 0.995,
            kd_down: 0.99,
        }
    }
}

/// Deterministic stand-in for a learned tuning policy.
///
/// Large error boosts `kp` and `kd`, small error slowly decays them. `ki` is
/// never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBasedTuner {
    rates: TuningRates,
}

impl RuleBasedTuner {
    /// Tuner with the default rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tuner with custom rates.
    pub fn with_rates(rates: TuningRates) -> ControlResult<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    /// Active rates.
    pub fn rates(&self) -> &TuningRates {
        &self.rates
    }
}

impl GainTuner for RuleBasedTuner {
    fn tune(&mut self, gains: &mut PidGains, error: f64) -> ControlResult<()> {
        let abs_e = ensure_error_value(error)?.abs();
        let r = &self.rates;
        if abs_e > r.error_threshold {
            gains.kp *= r.kp_up;
            gains.kd *= r.kd_up;
        } else {
            gains.kp *= r.kp_down;
            gains.kd *= r.kd_down;
        }
        tracing::trace!(kp = gains.kp, kd = gains.kd, error, "gains tuned");
        Ok(())
    }
}
