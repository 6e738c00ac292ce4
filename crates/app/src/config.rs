//! Command line and environment configuration

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use wallsketch_config::{BrushMode, LevelConfig};

pub const USAGE: &str = "\
Usage:
  wallsketch compile <record.json> [--config <level.json>] [--out <level-out.json>]
                     [--strict] [--combined]
  wallsketch inspect <record.json> [--strict]

Strokes whose point count does not fit their tool are skipped with a
warning unless --strict is given.

Environment:
  WALLSKETCH_BRUSH_MODE   cells | walls, overrides the level config
  RUST_LOG                log filter (default: info)";

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Compile a record and write the level export
    Compile(CompileOptions),
    /// Print a summary of a record
    Inspect { record: PathBuf, strict: bool },
    Help,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompileOptions {
    pub record: PathBuf,
    /// Level configuration file, defaults when absent
    pub config: Option<PathBuf>,
    /// Output file, stdout when absent
    pub out: Option<PathBuf>,
    /// Fail on strokes with a bad point count instead of skipping them
    pub strict: bool,
    /// Also export the packed vertex/index arena
    pub combined: bool,
}

impl Command {
    /// Parse arguments (without the program name)
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let Some(subcommand) = args.next() else {
            return Ok(Command::Help);
        };

        match subcommand.as_str() {
            "compile" => {
                let mut options = CompileOptions::default();
                let mut record = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--config" => options.config = Some(value_for(&mut args, "--config")?),
                        "--out" => options.out = Some(value_for(&mut args, "--out")?),
                        "--strict" => options.strict = true,
                        "--combined" => options.combined = true,
                        flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
                        path => set_record(&mut record, path)?,
                    }
                }
                options.record = record.context("Missing record path")?;
                Ok(Command::Compile(options))
            }
            "inspect" => {
                let mut record = None;
                let mut strict = false;
                for arg in args {
                    match arg.as_str() {
                        "--strict" => strict = true,
                        flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
                        path => set_record(&mut record, path)?,
                    }
                }
                Ok(Command::Inspect {
                    record: record.context("Missing record path")?,
                    strict,
                })
            }
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => bail!("Unknown command {other}"),
        }
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .with_context(|| format!("{flag} needs a value"))
}

fn set_record(record: &mut Option<PathBuf>, path: &str) -> Result<()> {
    if record.is_some() {
        bail!("Only one record path may be given (extra: {path})");
    }
    *record = Some(PathBuf::from(path));
    Ok(())
}

/// Parse a brush mode override from WALLSKETCH_BRUSH_MODE
pub fn brush_mode_from_env() -> Option<BrushMode> {
    parse_brush_mode(std::env::var("WALLSKETCH_BRUSH_MODE").ok()?.as_str())
}

fn parse_brush_mode(value: &str) -> Option<BrushMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cells" => Some(BrushMode::Cells),
        "walls" => Some(BrushMode::Walls),
        _ => None,
    }
}

/// Load the level configuration for a compile run.
pub fn load_level_config(options: &CompileOptions) -> Result<LevelConfig> {
    let mut config = match &options.config {
        Some(path) => LevelConfig::load(path)
            .with_context(|| format!("Failed to load level config {}", path.display()))?,
        None => LevelConfig::default(),
    };

    if let Some(mode) = brush_mode_from_env() {
        config.build.brush_mode = mode;
    }
    config.validate().context("Invalid level config")?;
    Ok(config)
}
