//! Error types for the settings crate.
//!
//! Structured errors for configuration files, job files and their
//! validation.

use apexprobe_camtools::CamToolError;
use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A configuration or job file is unusable.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Job parameters failed validation.
    #[error("Job error: {0}")]
    Job(#[from] CamToolError),
}

/// Errors related to configuration and job file structure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is missing.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// The file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The job kind is not one the generators know.
    #[error("Unknown job kind: {0}")]
    UnknownJobKind(String),

    /// The file is not a table of settings.
    #[error("Corrupted configuration: {0}")]
    Corrupted(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration structure checks.
pub type ConfigResult<T> = Result<T, ConfigError>;
