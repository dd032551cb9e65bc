//! ApexProbe Settings Crate
//!
//! Persisted configuration defaults and the job files that drive the
//! generators.

pub mod config;
pub mod error;
pub mod job;

pub use config::{
    Config, FileFormat, HeightDefaults, MachineDefaults, PostSettings, CONFIG_DIR_NAME,
    CONFIG_FILE_NAME,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use job::{Job, JobKind};
