//! Integration test: built-in scenarios run end to end.

use aitl_controls::PidGains;
use aitl_project::{ControllerDef, SignalDef, StepDef, builtin};
use aitl_sim::{SimError, run_scenario};

#[test]
fn simple_preset_stays_normal() {
    let scenario = builtin("simple").unwrap();
    let record = run_scenario(&scenario).unwrap();

    assert_eq!(record.ticks.len(), 1000);
    assert_eq!(record.summary.state_changes, 0);
    assert_eq!(record.summary.ticks_per_state["NORMAL"], 1000);
    assert_eq!(record.summary.final_kp, 1.0);
    assert!(record.summary.iae > 0.0);
    assert!(record.summary.final_output > 0.5 && record.summary.final_output < 1.0);
    assert_eq!(record.ticks[0].time_s, 0.0);
    assert_eq!(record.ticks[0].state_code, 0);
}

#[test]
fn disturbance_preset_applies_window() {
    let scenario = builtin("disturbance").unwrap();
    let record = run_scenario(&scenario).unwrap();

    assert_eq!(record.ticks[299].disturbance, 0.0);
    assert_eq!(record.ticks[350].disturbance, 0.8);
    assert_eq!(record.ticks[650].disturbance, 0.0);
}

#[test]
fn fault_preset_follows_latched_flags() {
    let scenario = builtin("fault").unwrap();
    let record = run_scenario(&scenario).unwrap();
    let states: Vec<&str> = record.ticks.iter().map(|t| t.state.as_str()).collect();

    assert_eq!(states.len(), 300);
    assert!(states[..10].iter().all(|s| *s == "IDLE"));
    assert_eq!(states[10], "STARTUP");
    assert_eq!(states[30], "RUN");
    assert_eq!(states[120], "FAULT");
    assert!(record.ticks[120..200].iter().all(|t| t.control == 0.0));
    assert_eq!(states[200], "IDLE");
    assert_eq!(states[201], "STARTUP");
    assert_eq!(states[202], "FAULT");
    assert_eq!(record.ticks[30].state_code, 3);
}

#[test]
fn step_response_starts_immediately() {
    let scenario = builtin("step-response").unwrap();
    let record = run_scenario(&scenario).unwrap();

    assert_eq!(record.ticks[0].state, "STARTUP");
    assert_eq!(record.ticks[1].state, "RUN");
    assert!(record.ticks[0].control > 0.0);
    assert!(record.summary.final_output > 0.5);
}

#[test]
fn startup_preset_idles_first() {
    let scenario = builtin("startup").unwrap();
    let record = run_scenario(&scenario).unwrap();

    assert_eq!(record.ticks.len(), 100);
    assert!(record.ticks[..10].iter().all(|t| t.control == 0.0 && t.plant_output == 0.0));
    assert_eq!(record.ticks[10].state, "STARTUP");
    assert_eq!(record.ticks[20].state, "RUN");
    assert!(record.summary.final_output > 0.0);
}

#[test]
fn reference_jump_tunes_gains() {
    let mut scenario = builtin("simple").unwrap();
    scenario.timing.t_end_s = 40.0;
    scenario.controller = ControllerDef::ErrorDriven {
        gains: PidGains::new(2.0, 1.0, 0.01),
        thresholds: None,
        tuning: None,
    };
    scenario.reference = SignalDef::Steps {
        initial: 0.0,
        steps: vec![StepDef {
            at_s: 0.1,
            value: 2.0,
        }],
    };

    let record = run_scenario(&scenario).unwrap();
    assert!(record.summary.ticks_per_state["DISTURB"] > 0);
    assert!(record.summary.ticks_per_state["TUNE"] > 0);
    assert!(record.summary.state_changes >= 2);
    assert_ne!(record.summary.final_kp, 2.0);
    assert_eq!(record.summary.final_ki, 1.0);
}

#[test]
fn invalid_plant_is_rejected() {
    let mut scenario = builtin("simple").unwrap();
    scenario.plant = aitl_project::PlantDef::FirstOrder { tau: 0.0 };
    assert!(matches!(run_scenario(&scenario), Err(SimError::Control(_))));
}
