//! Shared capability for per-tick controllers.

use std::fmt;

use crate::error::ControlResult;
use crate::pid::PidGains;

/// Discrete supervisor state with a stable code for logging.
pub trait ControlState: Copy + PartialEq + fmt::Debug + fmt::Display {
    /// Integer code used in logged series.
    fn code(&self) -> u8;

    /// Upper-case state name.
    fn label(&self) -> &'static str;
}

/// Result of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick<S> {
    /// Control output to apply to the plant.
    pub output: f64,
    /// Supervisor state after the tick.
    pub state: S,
}

/// A controller advanced once per simulation tick.
///
/// Implementations own all of their state; one instance per simulation run.
pub trait SteppingController {
    /// Supervisor state type.
    type State: ControlState;

    /// Run one tick against `reference` and `measurement` with sample period `dt`.
    fn tick(&mut self, reference: f64, measurement: f64, dt: f64) -> ControlResult<Tick<Self::State>>;

    /// Current supervisor state.
    fn state(&self) -> Self::State;

    /// Current PID gains.
    fn gains(&self) -> PidGains;

    /// Output produced by the last tick.
    fn last_output(&self) -> f64;

    /// Return PID memory and supervisor to their initial condition.
    fn reset(&mut self);
}
