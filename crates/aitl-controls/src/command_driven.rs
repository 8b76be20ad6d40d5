//! Command-driven orchestrator: PID gated by an IDLE/STARTUP/RUN/FAULT machine.

use crate::adaptive::{AdaptContext, AdaptiveLayer, NoAdaptation};
use crate::command::{Command, CommandFlags, CommandState, next_command_state};
use crate::error::{ControlResult, ensure_positive_dt};
use crate::pid::{Pid, PidGains};
use crate::stepping::{SteppingController, Tick};

/// Controller whose operating state follows external command flags.
///
/// The PID runs only in `Startup` and `Run`. In `Idle` and `Fault` the output
/// is forced to zero and the PID memory is kept as it was.
#[derive(Debug, Clone)]
pub struct CommandDrivenController<A = NoAdaptation> {
    pid: Pid,
    dt: f64,
    state: CommandState,
    commands: CommandFlags,
    setpoint: f64,
    measured: f64,
    control_output: f64,
    adaptive: A,
}

impl CommandDrivenController<NoAdaptation> {
    /// Controller with a fixed sample period and no adaptive layer.
    ///
    /// # Errors
    ///
    /// Returns error if `dt` is not positive.
    pub fn new(pid: Pid, dt: f64) -> ControlResult<Self> {
        Self::with_adaptive(pid, dt, NoAdaptation)
    }
}

impl<A: AdaptiveLayer> CommandDrivenController<A> {
    /// Controller with a custom adaptive layer.
    pub fn with_adaptive(pid: Pid, dt: f64, adaptive: A) -> ControlResult<Self> {
        let dt = ensure_positive_dt(dt)?;
        Ok(Self {
            pid,
            dt,
            state: CommandState::Idle,
            commands: CommandFlags::default(),
            setpoint: 0.0,
            measured: 0.0,
            control_output: 0.0,
            adaptive,
        })
    }

    /// Run one tick at the configured sample period.
    pub fn step(&mut self, measured: f64) -> ControlResult<f64> {
        self.step_with_dt(measured, self.dt)
    }

    fn step_with_dt(&mut self, measured: f64, dt: f64) -> ControlResult<f64> {
        let dt = ensure_positive_dt(dt)?;
        self.measured = measured;

        let next = next_command_state(self.state, &self.commands);
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, "command state transition");
            self.state = next;
        }

        self.control_output = if self.state.is_active() {
            self.pid.update_setpoint(self.setpoint, measured, dt)?
        } else {
            0.0
        };

        let ctx = AdaptContext {
            state: self.state,
            setpoint: self.setpoint,
            measured,
            control_output: self.control_output,
        };
        self.adaptive.adapt(&ctx, self.pid.gains_mut());

        Ok(self.control_output)
    }

    /// Set or clear one command flag.
    pub fn set_command(&mut self, command: Command, value: bool) {
        self.commands.set(command, value);
    }

    /// Clear every command flag.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Current command flags.
    pub fn commands(&self) -> &CommandFlags {
        &self.commands
    }

    /// Mutable command flags.
    pub fn commands_mut(&mut self) -> &mut CommandFlags {
        &mut self.commands
    }

    /// Setpoint the PID tracks.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Change the setpoint; takes effect on the next tick.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Measurement seen on the last tick.
    pub fn measured(&self) -> f64 {
        self.measured
    }

    /// Configured sample period.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Inner PID controller.
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Adaptive layer.
    pub fn adaptive(&self) -> &A {
        &self.adaptive
    }
}

impl<A: AdaptiveLayer> SteppingController for CommandDrivenController<A> {
    type State = CommandState;

    fn tick(&mut self, reference: f64, measurement: f64, dt: f64) -> ControlResult<Tick<Self::State>> {
        let dt = ensure_positive_dt(dt)?;
        self.setpoint = reference;
        let output = self.step_with_dt(measurement, dt)?;
        Ok(Tick {
            output,
            state: self.state,
        })
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn gains(&self) -> PidGains {
        self.pid.gain_set()
    }

    fn last_output(&self) -> f64 {
        self.control_output
    }

    fn reset(&mut self) {
        self.pid.reset();
        self.state = CommandState::Idle;
        self.control_output = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CommandDrivenController {
        let mut ctl = CommandDrivenController::new(Pid::new(1.0, 0.2, 0.05), 0.01).unwrap();
        ctl.set_setpoint(1.0);
        ctl
    }

    #[test]
    fn idle_outputs_zero() {
        let mut ctl = controller();
        assert_eq!(ctl.step(0.0).unwrap(), 0.0);
        assert_eq!(ctl.state(), CommandState::Idle);
        assert_eq!(ctl.pid().integral(), 0.0);
    }

    #[test]
    fn full_flag_sequence() {
        let mut ctl = controller();

        ctl.set_command(Command::Start, true);
        let u = ctl.step(0.0).unwrap();
        assert_eq!(ctl.state(), CommandState::Startup);
        assert!(u > 0.0);

        ctl.set_command(Command::StartupDone, true);
        ctl.step(0.1).unwrap();
        assert_eq!(ctl.state(), CommandState::Run);

        ctl.set_command(Command::ErrorDetected, true);
        assert_eq!(ctl.step(0.2).unwrap(), 0.0);
        assert_eq!(ctl.state(), CommandState::Fault);

        ctl.set_command(Command::Reset, true);
        ctl.set_command(Command::ErrorDetected, false);
        ctl.set_command(Command::Start, false);
        assert_eq!(ctl.step(0.2).unwrap(), 0.0);
        assert_eq!(ctl.state(), CommandState::Idle);
    }

    #[test]
    fn inactive_ticks_keep_pid_memory() {
        let mut ctl = controller();
        ctl.set_command(Command::Start, true);
        ctl.step(0.0).unwrap();
        let integral = ctl.pid().integral();

        ctl.set_command(Command::ErrorDetected, true);
        for _ in 0..5 {
            ctl.step(0.0).unwrap();
        }
        assert_eq!(ctl.pid().integral(), integral);
    }

    #[test]
    fn sticky_flags_are_not_cleared() {
        let mut ctl = controller();
        ctl.set_command(Command::Start, true);
        ctl.set_command(Command::ErrorDetected, true);
        ctl.set_command(Command::Reset, true);

        let mut seen = Vec::new();
        for _ in 0..4 {
            ctl.step(0.0).unwrap();
            seen.push(ctl.state());
        }
        assert_eq!(
            seen,
            vec![
                CommandState::Startup,
                CommandState::Fault,
                CommandState::Idle,
                CommandState::Startup
            ]
        );
        assert!(ctl.commands().error_detected);
    }

    #[test]
    fn invalid_dt_rejected() {
        assert!(CommandDrivenController::new(Pid::new(1.0, 0.0, 0.0), 0.0).is_err());
        let mut ctl = controller();
        assert!(ctl.tick(1.0, 0.0, -0.1).is_err());
    }

    #[test]
    fn adaptive_hook_runs_every_tick() {
        struct Counter(usize);
        impl AdaptiveLayer for Counter {
            fn adapt(&mut self, _ctx: &AdaptContext, _gains: &mut PidGains) {
                self.0 += 1;
            }
        }

        let mut ctl =
            CommandDrivenController::with_adaptive(Pid::new(1.0, 0.0, 0.0), 0.01, Counter(0)).unwrap();
        ctl.step(0.0).unwrap();
        ctl.set_command(Command::Start, true);
        ctl.step(0.0).unwrap();
        assert_eq!(ctl.adaptive().0, 2);
    }
}
