//! Scenario validation logic.

use crate::schema::{ControllerDef, PlantDef, SCENARIO_VERSION, Scenario, SignalDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version != SCENARIO_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(invalid("name", &scenario.name, "must not be empty"));
    }

    let timing = &scenario.timing;
    if !timing.dt_s.is_finite() || timing.dt_s <= 0.0 {
        return Err(invalid("timing.dt_s", timing.dt_s, "must be positive and finite"));
    }
    if !timing.t_end_s.is_finite() || timing.t_end_s < 0.0 {
        return Err(invalid(
            "timing.t_end_s",
            timing.t_end_s,
            "must be non-negative and finite",
        ));
    }

    match &scenario.plant {
        PlantDef::FirstOrder { tau } => {
            if !tau.is_finite() || *tau <= 0.0 {
                return Err(invalid("plant.tau", tau, "must be positive and finite"));
            }
        }
        PlantDef::Integrator { gain } => {
            if !gain.is_finite() || *gain <= 0.0 {
                return Err(invalid("plant.gain", gain, "must be positive and finite"));
            }
        }
    }

    validate_controller(&scenario.controller)?;
    validate_signal(&scenario.reference, "reference")?;
    if let Some(disturbance) = &scenario.disturbance {
        validate_signal(disturbance, "disturbance")?;
    }

    Ok(())
}

fn validate_controller(controller: &ControllerDef) -> Result<(), ValidationError> {
    let gains = controller.gains();
    for (name, value) in [("kp", gains.kp), ("ki", gains.ki), ("kd", gains.kd)] {
        if !value.is_finite() {
            return Err(invalid(
                &format!("controller.gains.{name}"),
                value,
                "must be finite",
            ));
        }
    }

    match controller {
        ControllerDef::ErrorDriven {
            thresholds, tuning, ..
        } => {
            if let Some(t) = thresholds
                && let Err(e) = t.validate()
            {
                return Err(invalid("controller.thresholds", format!("{t:?}"), &e.to_string()));
            }
            if let Some(r) = tuning
                && let Err(e) = r.validate()
            {
                return Err(invalid("controller.tuning", format!("{r:?}"), &e.to_string()));
            }
        }
        ControllerDef::CommandDriven { commands, .. } => {
            if commands.windows(2).any(|w| w[1].tick < w[0].tick) {
                return Err(invalid(
                    "controller.commands",
                    commands.len(),
                    "events must be sorted by tick",
                ));
            }
        }
    }
    Ok(())
}

fn validate_signal(signal: &SignalDef, field: &str) -> Result<(), ValidationError> {
    match signal {
        SignalDef::Constant { value } => finite(*value, &format!("{field}.value")),
        SignalDef::Window {
            value,
            start_s,
            end_s,
        } => {
            finite(*value, &format!("{field}.value"))?;
            finite(*start_s, &format!("{field}.start_s"))?;
            finite(*end_s, &format!("{field}.end_s"))?;
            if end_s < start_s {
                return Err(invalid(
                    &format!("{field}.end_s"),
                    end_s,
                    "must not be before start_s",
                ));
            }
            Ok(())
        }
        SignalDef::Steps { initial, steps } => {
            finite(*initial, &format!("{field}.initial"))?;
            for (i, step) in steps.iter().enumerate() {
                finite(step.at_s, &format!("{field}.steps[{i}].at_s"))?;
                finite(step.value, &format!("{field}.steps[{i}].value"))?;
            }
            if steps.windows(2).any(|w| w[1].at_s < w[0].at_s) {
                return Err(invalid(
                    &format!("{field}.steps"),
                    steps.len(),
                    "must be sorted by at_s",
                ));
            }
            Ok(())
        }
        SignalDef::Sine {
            offset,
            amplitude,
            frequency_hz,
            start_s,
        } => {
            finite(*offset, &format!("{field}.offset"))?;
            finite(*amplitude, &format!("{field}.amplitude"))?;
            finite(*start_s, &format!("{field}.start_s"))?;
            if !frequency_hz.is_finite() || *frequency_hz < 0.0 {
                return Err(invalid(
                    &format!("{field}.frequency_hz"),
                    frequency_hz,
                    "must be non-negative and finite",
                ));
            }
            Ok(())
        }
        SignalDef::Sequence { segments } => {
            if segments.is_empty() {
                return Err(invalid(
                    &format!("{field}.segments"),
                    0,
                    "must contain at least one segment",
                ));
            }
            if segments.windows(2).any(|w| w[1].start_s < w[0].start_s) {
                return Err(invalid(
                    &format!("{field}.segments"),
                    segments.len(),
                    "must be sorted by start_s",
                ));
            }
            for (i, segment) in segments.iter().enumerate() {
                finite(segment.start_s, &format!("{field}.segments[{i}].start_s"))?;
                validate_signal(&segment.signal, &format!("{field}.segments[{i}].signal"))?;
            }
            Ok(())
        }
    }
}

fn finite(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
