//! Error types for simulation operations.

use aitl_controls::ControlError;
use thiserror::Error;

/// Errors encountered while driving a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Control error at tick {step}: {source}")]
    Tick { step: usize, source: ControlError },

    #[error("Control error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;
