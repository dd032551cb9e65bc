//! Command-line front end

use anyhow::{bail, Context};
use apexprobe_core::{lookup_cycle_metadata, ArgLetter, CycleMetadata, ProbeCycle, WorkOffset};
use apexprobe_settings::{Config, Job};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "apexprobe",
    author,
    version,
    long_version = LONG_VERSION,
    about,
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log level selected by the `-v` flags.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an NC program from a job file (JSON or TOML)
    Generate {
        /// The job file to generate from.
        job: PathBuf,

        /// Configuration file, instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the program here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject malformed fields instead of substituting defaults
        #[arg(long)]
        strict: bool,
    },

    /// List the probing cycles
    Cycles,

    /// Show help text and argument defaults for a cycle key or picker label
    CycleInfo {
        /// e.g. `A11` or `A20 - Surface X`
        label: String,
    },

    /// Resolve a work offset to its positioning and macro addresses
    Wcs {
        /// Offset number, with or without the `G`
        id: String,

        /// Use the G154 P1-P99 bank
        #[arg(short, long)]
        extended: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write it, the default config location when omitted
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a parsed command, writing user-facing output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Command::Generate {
            job,
            config,
            output,
            strict,
        } => generate(job, config.as_deref(), output.as_deref(), *strict, out),
        Command::Cycles => list_cycles(out),
        Command::CycleInfo { label } => cycle_info(label, out),
        Command::Wcs { id, extended } => {
            let address = WorkOffset::new(id.as_str(), *extended).resolve();
            writeln!(out, "move:  {}", address.move_address)?;
            writeln!(out, "macro: {}", address.macro_address)?;
            Ok(())
        }
        Command::InitConfig { path, force } => init_config(path.as_deref(), *force, out),
    }
}

fn generate(
    job_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    strict: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(config_path).context("Failed to load configuration")?;
    let job = Job::load_from_file(job_path, &config)
        .with_context(|| format!("Failed to load job {}", job_path.display()))?;

    if strict {
        job.validate()
            .with_context(|| format!("Job {} is invalid", job_path.display()))?;
    }

    let program = job.generate();
    if program.is_empty() {
        warn!(kind = %job.kind(), "Job produced an empty program");
    }

    let mut text = program.to_string();
    if !text.is_empty() {
        text.push('\n');
    }

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), lines = program.len(), "Program written");
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

fn list_cycles(out: &mut dyn Write) -> anyhow::Result<()> {
    for cycle in ProbeCycle::ALL {
        let letters: Vec<String> = cycle.letters().iter().map(ToString::to_string).collect();
        writeln!(
            out,
            "{:<5} {:<24} {}",
            cycle.key(),
            cycle.label(),
            letters.join(" ")
        )?;
    }
    Ok(())
}

fn cycle_info(label: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let key = label.trim().to_uppercase();
    let meta: CycleMetadata = match key.parse::<ProbeCycle>() {
        Ok(cycle) => cycle.metadata(),
        Err(_) => lookup_cycle_metadata(label),
    };

    writeln!(out, "{}", meta.help)?;
    for letter in ArgLetter::ALL {
        let state = if meta.active.get(letter) {
            "active"
        } else {
            "inactive"
        };
        writeln!(out, "  {letter} = {:<6} {state}", meta.defaults.get(letter))?;
    }
    Ok(())
}

fn init_config(path: Option<&Path>, force: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }

    Config::default().save_to_file(&path)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}
