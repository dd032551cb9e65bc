//! # ApexProbe
//!
//! Generates Renishaw WIPS probing programs for Haas mills:
//! - Single probe-and-retract toolpaths around one measurement cycle
//! - Multi-feature measurement routines with tolerance alarms
//! - Multi-point flatness checks
//!
//! ## Architecture
//!
//! ApexProbe is organized as a workspace with multiple crates:
//!
//! 1. **apexprobe-core** - NC formatting, cycle table, program builder
//! 2. **apexprobe-camtools** - The program generators
//! 3. **apexprobe-settings** - Configuration defaults and job files
//! 4. **apexprobe** - This crate, logging setup and the command-line front end

pub mod cli;

pub use apexprobe_core::{
    build_cycle_line, lookup_cycle_metadata, normalize_decimal, parse_decimal, parse_tool_number,
    resolve_work_offset, unknown_cycle_line, ArgLetter, CycleArgs, CycleMetadata, FormValue,
    FormatError, GeneratedProgram, ProbeCycle, ProgramBuilder, ProgramWrap, Termination,
    WorkAddress, WorkOffset,
};

pub use apexprobe_camtools::{
    build_feature_sequence, build_flatness_routine, build_single_toolpath, CamToolError, Feature,
    FeatureSequenceGenerator, FlatnessGenerator, FlatnessParameters, FlatnessPoint,
    SequenceParameters, WipsToolpathGenerator, WipsToolpathParameters,
};

pub use apexprobe_settings::{Config, Job, JobKind, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for generated programs
/// - RUST_LOG environment variable support, `level` when unset
pub fn init_logging(level: tracing::Level, format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
