//! Job files
//!
//! A job file describes one generation request. The `kind` key picks the
//! generator; every other key overrides the config defaults for that kind.
//! Tables merge key by key, lists and scalars replace.
//!
//! ```toml
//! kind = "toolpath"
//! cycle = "A11"
//! x = 1.5
//! y = -2
//!
//! [args]
//! D = 2.0
//! H = -0.5
//! ```

use crate::config::{Config, FileFormat};
use crate::error::{ConfigError, SettingsResult};
use apexprobe_camtools::{
    FeatureSequenceGenerator, FlatnessGenerator, FlatnessParameters, SequenceParameters,
    WipsToolpathGenerator, WipsToolpathParameters,
};
use apexprobe_core::GeneratedProgram;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Which generator a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Toolpath,
    Sequence,
    Flatness,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [Self::Toolpath, Self::Sequence, Self::Flatness];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toolpath => "toolpath",
            Self::Sequence => "sequence",
            Self::Flatness => "flatness",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownJobKind(s.to_string()))
    }
}

/// One generation request with fully resolved parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    Toolpath(WipsToolpathParameters),
    Sequence(SequenceParameters),
    Flatness(FlatnessParameters),
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Toolpath(_) => JobKind::Toolpath,
            Self::Sequence(_) => JobKind::Sequence,
            Self::Flatness(_) => JobKind::Flatness,
        }
    }

    /// Load a job file (JSON or TOML) over the given config defaults.
    pub fn load_from_file(path: &Path, config: &Config) -> SettingsResult<Self> {
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let job = Self::parse(&content, format, config)?;
        info!(path = %path.display(), kind = %job.kind(), "Loaded job");
        Ok(job)
    }

    /// Parse job text over the given config defaults.
    pub fn parse(content: &str, format: FileFormat, config: &Config) -> SettingsResult<Self> {
        let layer: Value = format.parse(content)?;
        Self::from_value(layer, config)
    }

    /// Build a job from an already parsed document.
    pub fn from_value(layer: Value, config: &Config) -> SettingsResult<Self> {
        let Value::Object(mut layer) = layer else {
            let reason = "a job must be a table of settings".to_string();
            return Err(ConfigError::Corrupted(reason).into());
        };

        let kind: JobKind = layer
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::MissingKey("kind".to_string()))?
            .parse()?;
        layer.insert("kind".to_string(), Value::from(kind.as_str()));

        // An explicit argument table replaces the defaults instead of merging
        let explicit_args = layer.contains_key("args");
        let mut base = serde_json::to_value(config.job_defaults(kind))?;
        if explicit_args {
            if let Value::Object(table) = &mut base {
                table.remove("args");
            }
        }
        overlay(&mut base, Value::Object(layer));

        let mut job: Job = serde_json::from_value(base)?;
        if let Job::Toolpath(params) = &mut job {
            if !explicit_args {
                params.args = params.cycle.metadata().defaults.to_args();
            }
        }
        debug!(kind = %kind, explicit_args, "Resolved job parameters");
        Ok(job)
    }

    /// Strict check of the resolved parameters.
    pub fn validate(&self) -> SettingsResult<()> {
        match self {
            Self::Toolpath(params) => WipsToolpathGenerator::new(params.clone()).validate()?,
            Self::Sequence(params) => FeatureSequenceGenerator::new(params.clone()).validate()?,
            Self::Flatness(params) => FlatnessGenerator::new(params.clone()).validate()?,
        }
        Ok(())
    }

    pub fn generate(&self) -> GeneratedProgram {
        match self {
            Self::Toolpath(params) => apexprobe_camtools::build_single_toolpath(params),
            Self::Sequence(params) => apexprobe_camtools::build_feature_sequence(params),
            Self::Flatness(params) => apexprobe_camtools::build_flatness_routine(params),
        }
    }
}

fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => merge_tables(base, layer),
        (slot, value) => *slot = value,
    }
}

fn merge_tables(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        match base.get_mut(&key) {
            Some(slot) => overlay(slot, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_kind_parse() {
        assert_eq!("toolpath".parse::<JobKind>(), Ok(JobKind::Toolpath));
        assert_eq!(" Flatness ".parse::<JobKind>(), Ok(JobKind::Flatness));
        assert_eq!(
            "engrave".parse::<JobKind>(),
            Err(ConfigError::UnknownJobKind("engrave".to_string()))
        );
    }

    #[test]
    fn test_overlay_merges_tables_and_replaces_lists() {
        let mut base = json!({
            "a": 1,
            "wrap": { "enabled": false, "program_number": "1234" },
            "list": [1, 2, 3]
        });
        overlay(
            &mut base,
            json!({ "wrap": { "enabled": true }, "list": [9], "b": "x" }),
        );
        assert_eq!(
            base,
            json!({
                "a": 1,
                "b": "x",
                "wrap": { "enabled": true, "program_number": "1234" },
                "list": [9]
            })
        );
    }

    #[test]
    fn test_missing_kind() {
        let err = Job::from_value(json!({ "x": 1 }), &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::SettingsError::Config(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn test_non_table_job() {
        let err = Job::from_value(json!([1, 2]), &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::SettingsError::Config(ConfigError::Corrupted(_))
        ));
    }
}
