//! Evaluation of scenario signal profiles.

use aitl_project::SignalDef;
use std::f64::consts::PI;

/// Value of `signal` at time `t` (seconds).
pub fn sample(signal: &SignalDef, t: f64) -> f64 {
    match signal {
        SignalDef::Constant { value } => *value,
        SignalDef::Window {
            value,
            start_s,
            end_s,
        } => {
            if *start_s <= t && t < *end_s {
                *value
            } else {
                0.0
            }
        }
        SignalDef::Steps { initial, steps } => steps
            .iter()
            .take_while(|s| s.at_s <= t)
            .last()
            .map_or(*initial, |s| s.value),
        SignalDef::Sine {
            offset,
            amplitude,
            frequency_hz,
            start_s,
        } => offset + amplitude * (2.0 * PI * frequency_hz * (t - start_s)).sin(),
        SignalDef::Sequence { segments } => segments
            .iter()
            .take_while(|s| s.start_s <= t)
            .last()
            .map_or(0.0, |s| sample(&s.signal, t)),
    }
}
