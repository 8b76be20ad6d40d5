//! Error-driven orchestrator: PID inner loop, supervisor, and gain tuning.

use crate::error::{ControlResult, ensure_positive_dt};
use crate::pid::{Pid, PidGains};
use crate::stepping::{SteppingController, Tick};
use crate::supervisor::{Supervisor, SupervisorState};
use crate::tuning::{GainTuner, RuleBasedTuner};

/// Three-layer controller supervised by tracking-error magnitude.
///
/// Each step:
/// 1. `e = reference - measurement`
/// 2. supervisor transition on `e`
/// 3. gain tuning, only when the new state is `Tune`
/// 4. PID output from `(e, dt)`
///
/// # Example
///
/// ```
/// use aitl_controls::{ErrorDrivenController, Pid, SupervisorState};
///
/// let mut ctl = ErrorDrivenController::new(Pid::new(1.0, 0.1, 0.01));
/// let (u, state) = ctl.step(2.0, 0.0, 0.1).unwrap();
/// assert!(u > 0.0);
/// assert_eq!(state, SupervisorState::Disturb);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorDrivenController<T = RuleBasedTuner> {
    pid: Pid,
    supervisor: Supervisor,
    tuner: T,
    last_output: f64,
    last_error: f64,
}

impl ErrorDrivenController<RuleBasedTuner> {
    /// Controller with the default supervisor and rule-based tuner.
    pub fn new(pid: Pid) -> Self {
        Self::with_parts(pid, Supervisor::new(), RuleBasedTuner::new())
    }
}

impl<T: GainTuner> ErrorDrivenController<T> {
    /// Controller from explicit parts.
    pub fn with_parts(pid: Pid, supervisor: Supervisor, tuner: T) -> Self {
        Self {
            pid,
            supervisor,
            tuner,
            last_output: 0.0,
            last_error: 0.0,
        }
    }

    /// Run one tick and return `(output, state)`.
    ///
    /// # Errors
    ///
    /// Fails on non-positive `dt` or a non-finite error. `dt` is checked
    /// before the supervisor advances, so a failed tick changes nothing.
    pub fn step(
        &mut self,
        reference: f64,
        measurement: f64,
        dt: f64,
    ) -> ControlResult<(f64, SupervisorState)> {
        let dt = ensure_positive_dt(dt)?;
        let error = reference - measurement;

        let state = self.supervisor.transition(error)?;
        if state == SupervisorState::Tune {
            self.tuner.tune(self.pid.gains_mut(), error)?;
        }
        let output = self.pid.update(error, dt)?;

        self.last_output = output;
        self.last_error = error;
        Ok((output, state))
    }

    /// Inner PID controller.
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Supervisor.
    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Gain tuner.
    pub fn tuner(&self) -> &T {
        &self.tuner
    }

    /// Tracking error seen on the last tick.
    pub fn last_error(&self) -> f64 {
        self.last_error
    }
}

impl<T: GainTuner> SteppingController for ErrorDrivenController<T> {
    type State = SupervisorState;

    fn tick(&mut self, reference: f64, measurement: f64, dt: f64) -> ControlResult<Tick<Self::State>> {
        let (output, state) = self.step(reference, measurement, dt)?;
        Ok(Tick { output, state })
    }

    fn state(&self) -> SupervisorState {
        self.supervisor.state()
    }

    fn gains(&self) -> PidGains {
        self.pid.gain_set()
    }

    fn last_output(&self) -> f64 {
        self.last_output
    }

    fn reset(&mut self) {
        self.pid.reset();
        self.supervisor.reset();
        self.last_output = 0.0;
        self.last_error = 0.0;
    }
}
