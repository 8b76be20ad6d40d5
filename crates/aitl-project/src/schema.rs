//! Scenario schema definitions.

use aitl_controls::{Command, PidGains, SupervisorThresholds, TuningRates};
use serde::{Deserialize, Serialize};

/// Current scenario file version.
pub const SCENARIO_VERSION: u32 = 1;

/// A complete simulation run description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timing: TimingDef,
    pub plant: PlantDef,
    pub controller: ControllerDef,
    pub reference: SignalDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disturbance: Option<SignalDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimingDef {
    pub dt_s: f64,
    pub t_end_s: f64,
}

impl TimingDef {
    /// Number of ticks covering `[0, t_end)`.
    pub fn steps(&self) -> usize {
        if self.dt_s > 0.0 && self.t_end_s > 0.0 {
            (self.t_end_s / self.dt_s - 1e-9).ceil().max(0.0) as usize
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PlantDef {
    /// `dx/dt = (-x + u) / tau`
    FirstOrder { tau: f64 },
    /// `dx/dt = gain * u`
    Integrator { gain: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControllerDef {
    ErrorDriven {
        gains: PidGains,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thresholds: Option<SupervisorThresholds>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tuning: Option<TuningRates>,
    },
    CommandDriven {
        gains: PidGains,
        #[serde(default)]
        commands: Vec<CommandEventDef>,
    },
}

impl ControllerDef {
    pub fn gains(&self) -> &PidGains {
        match self {
            Self::ErrorDriven { gains, .. } | Self::CommandDriven { gains, .. } => gains,
        }
    }
}

/// Command flag change applied before the given tick runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CommandEventDef {
    pub tick: usize,
    pub command: Command,
    #[serde(default = "default_true")]
    pub value: bool,
}

fn default_true() -> bool {
    true
}

/// Time-varying scalar signal used for references and disturbances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SignalDef {
    Constant {
        value: f64,
    },
    /// `value` on `[start_s, end_s)`, zero elsewhere.
    Window {
        value: f64,
        start_s: f64,
        end_s: f64,
    },
    /// Piecewise-constant signal starting at `initial`.
    Steps {
        initial: f64,
        steps: Vec<StepDef>,
    },
    /// `offset + amplitude * sin(2*pi*frequency_hz*(t - start_s))`
    Sine {
        offset: f64,
        amplitude: f64,
        frequency_hz: f64,
        #[serde(default)]
        start_s: f64,
    },
    /// Switch between signals at segment start times. Zero before the first segment.
    Sequence {
        segments: Vec<SegmentDef>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StepDef {
    pub at_s: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub start_s: f64,
    pub signal: SignalDef,
}
