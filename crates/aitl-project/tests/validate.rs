use aitl_controls::{Command, SupervisorThresholds};
use aitl_project::schema::*;
use aitl_project::{ValidationError, builtin, validate_scenario};

fn expect_invalid(scenario: &Scenario, field_prefix: &str) {
    match validate_scenario(scenario) {
        Err(ValidationError::InvalidValue { field, .. }) => {
            assert!(
                field.starts_with(field_prefix),
                "expected field {field_prefix}, got {field}"
            );
        }
        other => panic!("expected invalid {field_prefix}, got {other:?}"),
    }
}

#[test]
fn rejects_unsupported_version() {
    let mut scenario = builtin("simple").unwrap();
    scenario.version = 99;
    assert!(matches!(
        validate_scenario(&scenario),
        Err(ValidationError::UnsupportedVersion { version: 99 })
    ));
}

#[test]
fn rejects_non_positive_timing_and_plant() {
    let mut scenario = builtin("simple").unwrap();
    scenario.timing.dt_s = 0.0;
    expect_invalid(&scenario, "timing.dt_s");

    let mut scenario = builtin("simple").unwrap();
    scenario.plant = PlantDef::FirstOrder { tau: -1.0 };
    expect_invalid(&scenario, "plant.tau");

    let mut scenario = builtin("fault").unwrap();
    scenario.plant = PlantDef::Integrator { gain: 0.0 };
    expect_invalid(&scenario, "plant.gain");
}

#[test]
fn rejects_inverted_thresholds() {
    let mut scenario = builtin("simple").unwrap();
    if let ControllerDef::ErrorDriven { thresholds, .. } = &mut scenario.controller {
        *thresholds = Some(SupervisorThresholds {
            disturb: 0.1,
            disturb_to_tune: 0.2,
            tune_to_normal: 0.05,
        });
    }
    expect_invalid(&scenario, "controller.thresholds");
}

#[test]
fn rejects_unsorted_commands() {
    let mut scenario = builtin("fault").unwrap();
    if let ControllerDef::CommandDriven { commands, .. } = &mut scenario.controller {
        commands.push(CommandEventDef {
            tick: 5,
            command: Command::Reset,
            value: true,
        });
    }
    expect_invalid(&scenario, "controller.commands");
}

#[test]
fn rejects_bad_signals() {
    let mut scenario = builtin("disturbance").unwrap();
    scenario.disturbance = Some(SignalDef::Window {
        value: 1.0,
        start_s: 5.0,
        end_s: 2.0,
    });
    expect_invalid(&scenario, "disturbance.end_s");

    let mut scenario = builtin("simple").unwrap();
    scenario.reference = SignalDef::Sequence { segments: vec![] };
    expect_invalid(&scenario, "reference.segments");

    let mut scenario = builtin("simple").unwrap();
    scenario.reference = SignalDef::Sequence {
        segments: vec![SegmentDef {
            start_s: 0.0,
            signal: SignalDef::Constant { value: f64::NAN },
        }],
    };
    expect_invalid(&scenario, "reference.segments[0].signal.value");
}
