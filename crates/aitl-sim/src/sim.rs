//! Simulation runner and result recording.

use std::collections::BTreeMap;

use aitl_controls::{
    CommandDrivenController, ControlState, ErrorDrivenController, FirstOrderPlant,
    IntegratorPlant, Pid, Plant, RuleBasedTuner, SteppingController, Supervisor,
};
use aitl_project::{CommandEventDef, ControllerDef, PlantDef, Scenario, SignalDef};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::signal::sample;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Record every N-th tick (decimation). The last tick is always recorded.
    pub record_every: usize,
    /// Maximum number of ticks (safety limit)
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            record_every: 1,
            max_steps: 10_000_000,
        }
    }
}

/// One logged tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub step: usize,
    pub time_s: f64,
    pub reference: f64,
    /// Plant output fed to the controller on this tick.
    pub measurement: f64,
    /// Plant output after applying the control and disturbance.
    pub plant_output: f64,
    pub control: f64,
    pub disturbance: f64,
    pub state_code: u8,
    pub state: String,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Aggregate figures for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: usize,
    pub final_output: f64,
    pub final_state: String,
    pub final_kp: f64,
    pub final_ki: f64,
    pub final_kd: f64,
    /// Integral of absolute tracking error.
    pub iae: f64,
    pub state_changes: usize,
    pub ticks_per_state: BTreeMap<String, usize>,
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord {
    pub scenario: String,
    pub dt_s: f64,
    pub ticks: Vec<TickRecord>,
    pub summary: RunSummary,
}

/// Run a scenario with default options.
pub fn run_scenario(scenario: &Scenario) -> SimResult<SimRecord> {
    run_scenario_with_options(scenario, &SimOptions::default())
}

/// Build the plant and controller described by `scenario` and run it to completion.
pub fn run_scenario_with_options(scenario: &Scenario, opts: &SimOptions) -> SimResult<SimRecord> {
    let mut plant = build_plant(&scenario.plant)?;
    let inputs = LoopInputs {
        dt: scenario.timing.dt_s,
        steps: scenario.timing.steps(),
        reference: &scenario.reference,
        disturbance: scenario.disturbance.as_ref(),
    };

    tracing::info!(
        scenario = %scenario.name,
        steps = inputs.steps,
        dt = inputs.dt,
        "starting run"
    );

    let (ticks, summary) = match &scenario.controller {
        ControllerDef::ErrorDriven {
            gains,
            thresholds,
            tuning,
        } => {
            let supervisor = match thresholds {
                Some(t) => Supervisor::with_thresholds(*t)?,
                None => Supervisor::new(),
            };
            let tuner = match tuning {
                Some(r) => RuleBasedTuner::with_rates(*r)?,
                None => RuleBasedTuner::new(),
            };
            let mut ctl = ErrorDrivenController::with_parts(Pid::with_gains(*gains), supervisor, tuner);
            run_loop(&mut ctl, plant.as_mut(), &inputs, opts, |_, _| {})?
        }
        ControllerDef::CommandDriven { gains, commands } => {
            let mut ctl = CommandDrivenController::new(Pid::with_gains(*gains), inputs.dt)?;
            run_loop(&mut ctl, plant.as_mut(), &inputs, opts, |step, ctl| {
                apply_commands(commands, step, ctl)
            })?
        }
    };

    tracing::info!(
        scenario = %scenario.name,
        final_output = summary.final_output,
        iae = summary.iae,
        state_changes = summary.state_changes,
        "run finished"
    );

    Ok(SimRecord {
        scenario: scenario.name.clone(),
        dt_s: inputs.dt,
        ticks,
        summary,
    })
}

/// Construct the plant model for a scenario.
pub fn build_plant(def: &PlantDef) -> SimResult<Box<dyn Plant>> {
    Ok(match def {
        PlantDef::FirstOrder { tau } => Box::new(FirstOrderPlant::new(*tau)?),
        PlantDef::Integrator { gain } => Box::new(IntegratorPlant::new(*gain)?),
    })
}

fn apply_commands(events: &[CommandEventDef], step: usize, ctl: &mut CommandDrivenController) {
    for ev in events.iter().filter(|ev| ev.tick == step) {
        tracing::debug!(step, command = ?ev.command, value = ev.value, "command flag");
        ctl.set_command(ev.command, ev.value);
    }
}

/// Signals and timing for one run.
pub struct LoopInputs<'a> {
    pub dt: f64,
    pub steps: usize,
    pub reference: &'a SignalDef,
    pub disturbance: Option<&'a SignalDef>,
}

/// Drive `ctl` and `plant` for `inputs.steps` ticks.
///
/// Each tick reads the plant output as the measurement, runs the controller,
/// and steps the plant with the control output plus disturbance. `before_tick`
/// runs first on every tick and may change controller inputs such as command
/// flags.
pub fn run_loop<C, F>(
    ctl: &mut C,
    plant: &mut dyn Plant,
    inputs: &LoopInputs<'_>,
    opts: &SimOptions,
    mut before_tick: F,
) -> SimResult<(Vec<TickRecord>, RunSummary)>
where
    C: SteppingController,
    F: FnMut(usize, &mut C),
{
    if !(inputs.dt > 0.0) {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }
    if inputs.steps > opts.max_steps {
        return Err(SimError::InvalidArg {
            what: "run exceeds max_steps",
        });
    }

    let mut records = Vec::with_capacity(inputs.steps / opts.record_every + 1);
    let mut summary = RunSummary::default();
    let mut prev_state = ctl.state();

    for step in 0..inputs.steps {
        let t = step as f64 * inputs.dt;
        before_tick(step, ctl);

        let reference = sample(inputs.reference, t);
        let disturbance = inputs.disturbance.map_or(0.0, |d| sample(d, t));
        let measurement = plant.state();

        let tick = ctl
            .tick(reference, measurement, inputs.dt)
            .map_err(|source| SimError::Tick { step, source })?;
        let plant_output = plant
            .step(tick.output + disturbance, inputs.dt)
            .map_err(|source| SimError::Tick { step, source })?;

        summary.iae += (reference - measurement).abs() * inputs.dt;
        *summary
            .ticks_per_state
            .entry(tick.state.label().to_string())
            .or_default() += 1;
        if tick.state != prev_state {
            summary.state_changes += 1;
            prev_state = tick.state;
        }

        let is_last = step + 1 == inputs.steps;
        if step % opts.record_every == 0 || is_last {
            let gains = ctl.gains();
            records.push(TickRecord {
                step,
                time_s: t,
                reference,
                measurement,
                plant_output,
                control: tick.output,
                disturbance,
                state_code: tick.state.code(),
                state: tick.state.label().to_string(),
                kp: gains.kp,
                ki: gains.ki,
                kd: gains.kd,
            });
        }
    }

    let gains = ctl.gains();
    summary.steps = inputs.steps;
    summary.final_output = plant.state();
    summary.final_state = ctl.state().label().to_string();
    summary.final_kp = gains.kp;
    summary.final_ki = gains.ki;
    summary.final_kd = gains.kd;

    Ok((records, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aitl_controls::PidGains;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.record_every, 1);
        assert_eq!(opts.max_steps, 10_000_000);
    }

    #[test]
    fn rejects_zero_decimation() {
        let mut ctl = ErrorDrivenController::new(Pid::new(1.0, 0.0, 0.0));
        let mut plant = FirstOrderPlant::default();
        let reference = SignalDef::Constant { value: 1.0 };
        let inputs = LoopInputs {
            dt: 0.01,
            steps: 10,
            reference: &reference,
            disturbance: None,
        };
        let opts = SimOptions {
            record_every: 0,
            ..SimOptions::default()
        };
        assert!(matches!(
            run_loop(&mut ctl, &mut plant, &inputs, &opts, |_, _| {}),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn decimation_keeps_last_tick() {
        let mut ctl = ErrorDrivenController::new(Pid::with_gains(PidGains::new(1.0, 0.2, 0.01)));
        let mut plant = FirstOrderPlant::default();
        let reference = SignalDef::Constant { value: 1.0 };
        let inputs = LoopInputs {
            dt: 0.01,
            steps: 25,
            reference: &reference,
            disturbance: None,
        };
        let opts = SimOptions {
            record_every: 10,
            ..SimOptions::default()
        };
        let (records, summary) = run_loop(&mut ctl, &mut plant, &inputs, &opts, |_, _| {}).unwrap();
        let steps: Vec<_> = records.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 10, 20, 24]);
        assert_eq!(summary.steps, 25);
        assert_eq!(summary.ticks_per_state["NORMAL"], 25);
    }

    #[test]
    fn measurement_precedes_plant_step() {
        let mut ctl = ErrorDrivenController::new(Pid::new(1.0, 0.0, 0.0));
        let mut plant = FirstOrderPlant::default();
        let reference = SignalDef::Constant { value: 1.0 };
        let inputs = LoopInputs {
            dt: 0.1,
            steps: 3,
            reference: &reference,
            disturbance: None,
        };
        let (records, _) =
            run_loop(&mut ctl, &mut plant, &inputs, &SimOptions::default(), |_, _| {}).unwrap();
        assert_eq!(records[0].measurement, 0.0);
        assert_eq!(records[1].measurement, records[0].plant_output);
        assert_eq!(records[2].measurement, records[1].plant_output);
    }
}
