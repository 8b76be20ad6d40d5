//! Built-in scenarios.
//!
//! Error-driven presets run the three-layer loop on a first-order plant.
//! Command-driven presets run the gated PID on an integrator plant with
//! command flags raised at fixed ticks.

use aitl_controls::{Command, PidGains};

use crate::schema::{
    CommandEventDef, ControllerDef, PlantDef, SCENARIO_VERSION, Scenario, SegmentDef, SignalDef,
    TimingDef,
};

/// Names accepted by [`builtin`].
pub const PRESET_NAMES: &[&str] = &[
    "simple",
    "disturbance",
    "tracking",
    "tuning",
    "step-response",
    "fault",
    "startup",
];

/// Look up a built-in scenario by name.
pub fn builtin(name: &str) -> Option<Scenario> {
    let scenario = match name {
        "simple" => error_driven(
            "simple",
            "Constant reference on a first-order plant",
            10.0,
            PidGains::new(1.0, 0.2, 0.01),
            SignalDef::Constant { value: 1.0 },
            None,
        ),
        "disturbance" => error_driven(
            "disturbance",
            "Constant load disturbance between 3 s and 6 s",
            10.0,
            PidGains::new(1.0, 0.2, 0.01),
            SignalDef::Constant { value: 1.0 },
            Some(SignalDef::Window {
                value: 0.8,
                start_s: 3.0,
                end_s: 6.0,
            }),
        ),
        "tracking" => error_driven(
            "tracking",
            "Step down at 3 s, sinusoidal reference from 6 s",
            10.0,
            PidGains::new(1.0, 0.2, 0.01),
            SignalDef::Sequence {
                segments: vec![
                    SegmentDef {
                        start_s: 0.0,
                        signal: SignalDef::Constant { value: 1.0 },
                    },
                    SegmentDef {
                        start_s: 3.0,
                        signal: SignalDef::Constant { value: 0.5 },
                    },
                    SegmentDef {
                        start_s: 6.0,
                        signal: SignalDef::Sine {
                            offset: 1.0,
                            amplitude: 0.3,
                            frequency_hz: 0.5,
                            start_s: 6.0,
                        },
                    },
                ],
            },
            None,
        ),
        "tuning" => error_driven(
            "tuning",
            "Detuned gains adapted over a long run",
            12.0,
            PidGains::new(0.8, 0.1, 0.01),
            SignalDef::Constant { value: 1.0 },
            None,
        ),
        "step-response" => command_driven(
            "step-response",
            "Start and startup-done raised before the first tick",
            5.0,
            PidGains::new(1.0, 0.2, 0.05),
            1.0,
            1.0,
            vec![event(0, Command::Start), event(0, Command::StartupDone)],
        ),
        "fault" => command_driven(
            "fault",
            "Fault raised during RUN and reset later; flags stay latched",
            3.0,
            PidGains::new(1.0, 0.2, 0.05),
            1.0,
            1.0,
            vec![
                event(10, Command::Start),
                event(30, Command::StartupDone),
                event(120, Command::ErrorDetected),
                event(200, Command::Reset),
            ],
        ),
        "startup" => command_driven(
            "startup",
            "Startup sequence toward a setpoint of 10",
            1.0,
            PidGains::new(1.2, 0.5, 0.1),
            10.0,
            5.0,
            vec![event(10, Command::Start), event(20, Command::StartupDone)],
        ),
        _ => return None,
    };
    Some(scenario)
}

fn error_driven(
    name: &str,
    description: &str,
    t_end_s: f64,
    gains: PidGains,
    reference: SignalDef,
    disturbance: Option<SignalDef>,
) -> Scenario {
    Scenario {
        version: SCENARIO_VERSION,
        name: name.to_string(),
        description: Some(description.to_string()),
        timing: TimingDef {
            dt_s: 0.01,
            t_end_s,
        },
        plant: PlantDef::FirstOrder { tau: 1.0 },
        controller: ControllerDef::ErrorDriven {
            gains,
            thresholds: None,
            tuning: None,
        },
        reference,
        disturbance,
    }
}

fn command_driven(
    name: &str,
    description: &str,
    t_end_s: f64,
    gains: PidGains,
    setpoint: f64,
    plant_gain: f64,
    commands: Vec<CommandEventDef>,
) -> Scenario {
    Scenario {
        version: SCENARIO_VERSION,
        name: name.to_string(),
        description: Some(description.to_string()),
        timing: TimingDef {
            dt_s: 0.01,
            t_end_s,
        },
        plant: PlantDef::Integrator { gain: plant_gain },
        controller: ControllerDef::CommandDriven { gains, commands },
        reference: SignalDef::Constant { value: setpoint },
        disturbance: None,
    }
}

fn event(tick: usize, command: Command) -> CommandEventDef {
    CommandEventDef {
        tick,
        command,
        value: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_scenario;

    #[test]
    fn every_preset_is_valid() {
        for name in PRESET_NAMES {
            let scenario = builtin(name).unwrap();
            assert_eq!(scenario.name, *name);
            validate_scenario(&scenario).unwrap();
        }
    }

    #[test]
    fn unknown_preset() {
        assert!(builtin("nope").is_none());
    }
}
