//! Error-driven supervisory state machine.
//!
//! The supervisor watches the magnitude of the tracking error and decides
//! whether the loop is tracking normally, recovering from a disturbance, or in
//! the tuning phase where the outer layer may rescale the PID gains.
//!
//! Recovery is two-stage: a disturbed loop must pass through `Tune` before it
//! can return to `Normal`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ControlError, ControlResult, ensure_error_value};
use crate::stepping::ControlState;
use serde::{Deserialize, Serialize};

/// Supervisor states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupervisorState {
    /// Normal tracking condition.
    #[default]
    Normal,
    /// Large disturbance detected.
    Disturb,
    /// Recovery phase where the tuning layer adjusts gains.
    Tune,
}

impl ControlState for SupervisorState {
    fn code(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Disturb => 1,
            Self::Tune => 2,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Disturb => "DISTURB",
            Self::Tune => "TUNE",
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SupervisorState {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "DISTURB" => Ok(Self::Disturb),
            "TUNE" => Ok(Self::Tune),
            other => Err(ControlError::InvalidState {
                label: other.to_string(),
            }),
        }
    }
}

/// Error magnitudes that drive the supervisor transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupervisorThresholds {
    /// `|e|` above this forces `Disturb` from any state.
    pub disturb: f64,
    /// `|e|` below this moves `Disturb` to `Tune`.
    pub disturb_to_tune: f64,
    /// `|e|` below this moves `Tune` to `Normal`.
    pub tune_to_normal: f64,
}

impl SupervisorThresholds {
    /// Check ordering `0 < tune_to_normal < disturb_to_tune <= disturb`.
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.tune_to_normal > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "tune_to_normal threshold must be positive",
            });
        }
        if !(self.tune_to_normal < self.disturb_to_tune) {
            return Err(ControlError::InvalidArg {
                what: "tune_to_normal threshold must be below disturb_to_tune",
            });
        }
        if !(self.disturb_to_tune <= self.disturb) {
            return Err(ControlError::InvalidArg {
                what: "disturb_to_tune threshold must not exceed disturb",
            });
        }
        Ok(())
    }
}

impl Default for SupervisorThresholds {
    fn default() -> Self {
        Self {
            disturb: 1.0,
            disturb_to_tune: 0.2,
            tune_to_normal: 0.05,
        }
    }
}

/// Error-driven supervisor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Supervisor {
    state: SupervisorState,
    thresholds: SupervisorThresholds,
}

impl Supervisor {
    /// Create a supervisor in `Normal` with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a supervisor with custom thresholds.
    pub fn with_thresholds(thresholds: SupervisorThresholds) -> ControlResult<Self> {
        thresholds.validate()?;
        Ok(Self {
            state: SupervisorState::Normal,
            thresholds,
        })
    }

    /// Current state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Active thresholds.
    pub fn thresholds(&self) -> &SupervisorThresholds {
        &self.thresholds
    }

    /// Force the supervisor back to `Normal`.
    pub fn reset(&mut self) {
        self.state = SupervisorState::Normal;
    }

    /// Advance the state machine with the current tracking error.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `error` is not finite; the state
    /// is unchanged in that case.
    pub fn transition(&mut self, error: f64) -> ControlResult<SupervisorState> {
        let abs_e = ensure_error_value(error)?.abs();
        let next = next_state(self.state, abs_e, &self.thresholds);
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, error, "supervisor transition");
            self.state = next;
        }
        Ok(self.state)
    }
}

/// Pure transition rule.
pub fn next_state(
    state: SupervisorState,
    abs_e: f64,
    thresholds: &SupervisorThresholds,
) -> SupervisorState {
    use SupervisorState::*;

    if abs_e > thresholds.disturb {
        Disturb
    } else if state == Disturb && abs_e < thresholds.disturb_to_tune {
        Tune
    } else if state == Tune && abs_e < thresholds.tune_to_normal {
        Normal
    } else {
        state
    }
}
