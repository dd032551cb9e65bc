//! Error types for the CAM tools crate.
//!
//! Generation itself never fails. These errors come from the `validate`
//! methods a front end calls before generating, so it can report bad input
//! instead of receiving a defaulted program.

use apexprobe_core::FormatError;
use thiserror::Error;

/// Errors that can occur while checking generator parameters.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// A value could not be formatted for the controller.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// Errors related to generator parameter validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParameterError {
    /// A required parameter is missing.
    #[error("Missing required parameter: {0}")]
    Missing(String),

    /// A list parameter has too few entries.
    #[error("Parameter '{name}' needs at least {min} entries, got {actual}")]
    TooFew {
        name: String,
        min: usize,
        actual: usize,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Check that a form value is blank or a plain decimal.
pub(crate) fn check_decimal(name: &str, value: &apexprobe_core::FormValue) -> ParameterResult<()> {
    apexprobe_core::parse_decimal(value.as_str())
        .map(|_| ())
        .map_err(|e| ParameterError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

/// Check that a macro variable identifier is a variable number.
pub(crate) fn check_variable(name: &str, id: &str) -> ParameterResult<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParameterError::InvalidValue {
            name: name.to_string(),
            reason: format!("'{id}' is not a macro variable number"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::Missing("features".to_string());
        assert_eq!(err.to_string(), "Missing required parameter: features");

        let err = ParameterError::TooFew {
            name: "points".to_string(),
            min: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'points' needs at least 2 entries, got 1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let cam_err: CamToolError = ParameterError::Missing("x".to_string()).into();
        assert!(matches!(cam_err, CamToolError::Parameter(_)));

        let cam_err: CamToolError = FormatError::UnknownCycle("A99".to_string()).into();
        assert!(matches!(cam_err, CamToolError::Format(_)));
    }

    #[test]
    fn test_check_helpers() {
        assert!(check_decimal("x", &"1.5".into()).is_ok());
        assert!(check_decimal("x", &"".into()).is_ok());
        assert!(check_decimal("x", &"1..5".into()).is_err());
        assert!(check_variable("macro", "901").is_ok());
        assert!(check_variable("macro", "9o1").is_err());
    }
}
