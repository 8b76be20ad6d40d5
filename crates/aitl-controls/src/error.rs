//! Error types for control loop operations.

use thiserror::Error;

/// Result type for control loop operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control loop operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// State label that does not name any supervisor state.
    #[error("Invalid state label: {label}")]
    InvalidState { label: String },
}

/// Reject non-positive or NaN sample periods.
pub(crate) fn ensure_positive_dt(dt: f64) -> ControlResult<f64> {
    if dt > 0.0 {
        Ok(dt)
    } else {
        Err(ControlError::InvalidArg {
            what: "dt must be positive",
        })
    }
}

/// Reject a missing (non-finite) tracking error.
pub(crate) fn ensure_error_value(error: f64) -> ControlResult<f64> {
    if error.is_finite() {
        Ok(error)
    } else {
        Err(ControlError::InvalidArg {
            what: "error value must be finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_checks() {
        assert_eq!(ensure_positive_dt(0.1), Ok(0.1));
        assert!(ensure_positive_dt(0.0).is_err());
        assert!(ensure_positive_dt(-1.0).is_err());
        assert!(ensure_positive_dt(f64::NAN).is_err());
    }

    #[test]
    fn error_value_message() {
        let err = ensure_error_value(f64::NAN).unwrap_err();
        assert!(format!("{err}").contains("Invalid argument"));
    }
}
