//! Error types for the core crate.
//!
//! Formatting primitives never abort a generation. These errors are what the
//! fallible variants report, so callers can tell a blank field that was
//! validly defaulted from garbage that was coerced.

use thiserror::Error;

/// Errors reported by the formatting primitives and the cycle table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The value is not a plain decimal number.
    #[error("Malformed decimal value: '{0}'")]
    MalformedDecimal(String),

    /// The value is a number written with an exponent, which NC words cannot
    /// carry.
    #[error("Exponent notation is not supported: '{0}', write it as a plain decimal")]
    ExponentNotation(String),

    /// The work offset identifier does not parse as an integer.
    #[error("Malformed work offset '{raw}' (using '{cleaned}' verbatim)")]
    MalformedWorkOffset {
        /// The identifier as supplied.
        raw: String,
        /// The identifier after whitespace and the leading `G` were removed.
        cleaned: String,
    },

    /// The cycle key is not one of the known probing cycles.
    #[error("Unknown probe cycle: {0}")]
    UnknownCycle(String),

    /// The tool number is not a non-negative number.
    #[error("Malformed tool number: '{0}'")]
    MalformedToolNumber(String),
}

/// Result type alias for formatting operations.
pub type FormatResult<T> = Result<T, FormatError>;
