//! Closed-loop simulation driver for AITL scenarios.
//!
//! Provides:
//! - Signal profile evaluation for references and disturbances
//! - Plant and controller construction from scenario definitions
//! - A fixed-step driver loop with per-tick logging and a run summary

pub mod error;
pub mod signal;
pub mod sim;

pub use error::{SimError, SimResult};
pub use signal::sample;
pub use sim::{
    LoopInputs, RunSummary, SimOptions, SimRecord, TickRecord, build_plant, run_loop,
    run_scenario, run_scenario_with_options,
};
