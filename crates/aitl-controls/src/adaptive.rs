//! Adaptive hook run after every command-driven tick.

use crate::command::CommandState;
use crate::pid::PidGains;

/// Snapshot of the controller handed to the adaptive layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptContext {
    /// Operating state after this tick's transition.
    pub state: CommandState,
    /// Setpoint the PID tracked.
    pub setpoint: f64,
    /// Measurement passed to the tick.
    pub measured: f64,
    /// Output produced by the tick, zero when inactive.
    pub control_output: f64,
}

/// Slot for gain adaptation logic in the command-driven controller.
///
/// Called once per tick regardless of state.
pub trait AdaptiveLayer {
    /// Inspect the finished tick and adjust `gains` in place.
    fn adapt(&mut self, ctx: &AdaptContext, gains: &mut PidGains);
}

/// Adaptive layer that does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAdaptation;

impl AdaptiveLayer for NoAdaptation {
    fn adapt(&mut self, _ctx: &AdaptContext, _gains: &mut PidGains) {}
}
