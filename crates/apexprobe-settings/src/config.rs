//! Configuration for ApexProbe
//!
//! Persisted defaults applied to every job before the job file's own values:
//! - Machine defaults (probe tool, work offsets, probing plane)
//! - Approach heights for single toolpaths and for measurement routines
//! - Post settings (program wrap, O-number, termination code)
//!
//! Files are JSON or TOML, chosen by extension.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use crate::job::{Job, JobKind};
use apexprobe_camtools::{FlatnessParameters, SequenceParameters, WipsToolpathParameters};
use apexprobe_core::{parse_decimal, FormValue, ProgramWrap, Termination, WorkOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory under the platform config dir holding ApexProbe files.
pub const CONFIG_DIR_NAME: &str = "apexprobe";

/// File name of the default configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// On-disk format of a config or job file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<no extension>").to_string(),
            )),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> SettingsResult<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
        })
    }

    pub fn render<T: Serialize>(self, value: &T) -> SettingsResult<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Toml => toml::to_string_pretty(value)?,
        })
    }
}

/// Machine defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineDefaults {
    /// Probe tool number, also its length offset
    #[serde(deserialize_with = "apexprobe_core::deserialize_tool_number")]
    pub probe_tool: u32,
    /// Height the stylus is brought to before a cycle
    pub probing_plane_z: FormValue,
    /// Work offset measured in
    pub work_offset: WorkOffset,
    /// Offset the flatness routine may overwrite
    pub sacrificial_offset: WorkOffset,
}

impl Default for MachineDefaults {
    fn default() -> Self {
        Self {
            probe_tool: 50,
            probing_plane_z: "0.1".into(),
            work_offset: WorkOffset::lobby(54),
            sacrificial_offset: WorkOffset::extended(97),
        }
    }
}

/// Clearance and protected heights for one kind of routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightDefaults {
    pub clearance_z: FormValue,
    pub protected_z: FormValue,
}

impl HeightDefaults {
    pub fn new(clearance_z: &str, protected_z: &str) -> Self {
        Self {
            clearance_z: clearance_z.into(),
            protected_z: protected_z.into(),
        }
    }
}

impl Default for HeightDefaults {
    fn default() -> Self {
        Self::new("6.0", "1.0")
    }
}

/// Program header/footer defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    /// Emit `%`, the O-number line and the termination code
    pub wrap_program: bool,
    pub program_number: String,
    pub termination: Termination,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            wrap_program: false,
            program_number: "1234".to_string(),
            termination: Termination::ProgramEnd,
        }
    }
}

impl PostSettings {
    pub fn wrap(&self) -> ProgramWrap {
        ProgramWrap {
            enabled: self.wrap_program,
            program_number: self.program_number.clone(),
            termination: self.termination,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub machine: MachineDefaults,
    /// Heights for single WIPS toolpaths
    pub toolpath: HeightDefaults,
    /// Heights for feature sequences and flatness routines
    pub measurement: HeightDefaults,
    pub post: PostSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            machine: MachineDefaults::default(),
            toolpath: HeightDefaults::new("1.0", "0.5"),
            measurement: HeightDefaults::default(),
            post: PostSettings::default(),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the default config file, `<config dir>/apexprobe/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = format.parse(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load the given file, or the default file when it exists, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from_file(&path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save config to file (JSON or TOML), creating the parent directory.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = FileFormat::from_path(path)?;
        let content = format.render(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.machine
            .work_offset
            .try_resolve()
            .map_err(|e| invalid("machine.work_offset", e))?;
        self.machine
            .sacrificial_offset
            .try_resolve()
            .map_err(|e| invalid("machine.sacrificial_offset", e))?;

        let decimals = [
            ("machine.probing_plane_z", &self.machine.probing_plane_z),
            ("toolpath.clearance_z", &self.toolpath.clearance_z),
            ("toolpath.protected_z", &self.toolpath.protected_z),
            ("measurement.clearance_z", &self.measurement.clearance_z),
            ("measurement.protected_z", &self.measurement.protected_z),
        ];
        for (key, value) in decimals {
            parse_decimal(value.as_str()).map_err(|e| invalid(key, e))?;
        }

        // A blank number is only read when programs are wrapped
        let number = self.post.wrap().cleaned_number();
        let blank_allowed = number.is_empty() && !self.post.wrap_program;
        if !blank_allowed && (number.is_empty() || !number.chars().all(|c| c.is_ascii_digit())) {
            return Err(invalid(
                "post.program_number",
                format!("'{}' is not a program number", self.post.program_number),
            ));
        }
        Ok(())
    }

    /// Defaults for a job of the given kind, before the job file applies.
    pub fn job_defaults(&self, kind: JobKind) -> Job {
        match kind {
            JobKind::Toolpath => Job::Toolpath(self.toolpath_defaults()),
            JobKind::Sequence => Job::Sequence(self.sequence_defaults()),
            JobKind::Flatness => Job::Flatness(self.flatness_defaults()),
        }
    }

    pub fn toolpath_defaults(&self) -> WipsToolpathParameters {
        WipsToolpathParameters {
            tool_number: self.machine.probe_tool,
            work_offset: self.machine.work_offset.clone(),
            clearance_z: self.toolpath.clearance_z.clone(),
            protected_z: self.toolpath.protected_z.clone(),
            probing_plane_z: self.machine.probing_plane_z.clone(),
            wrap: self.post.wrap(),
            ..Default::default()
        }
    }

    pub fn sequence_defaults(&self) -> SequenceParameters {
        SequenceParameters {
            tool_number: self.machine.probe_tool,
            work_offset: self.machine.work_offset.clone(),
            clearance_z: self.measurement.clearance_z.clone(),
            protected_z: self.measurement.protected_z.clone(),
            wrap: self.post.wrap(),
            ..Default::default()
        }
    }

    pub fn flatness_defaults(&self) -> FlatnessParameters {
        FlatnessParameters {
            tool_number: self.machine.probe_tool,
            work_offset: self.machine.work_offset.clone(),
            sacrificial_offset: self.machine.sacrificial_offset.clone(),
            clearance_z: self.measurement.clearance_z.clone(),
            protected_z: self.measurement.protected_z.clone(),
            wrap: self.post.wrap(),
            ..Default::default()
        }
    }
}

fn invalid(key: &str, reason: impl ToString) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
