//! wallsketch - turn saved stroke drawings into level geometry

use std::io::Write;

use anyhow::{Context, Result};
use strokes::{DecodedRecord, ToolKind, load_record, load_record_lenient};
use tracing::info;
use wallgen::GeometryCompiler;

mod config;
mod export;

use config::{Command, CompileOptions, USAGE};
use export::LevelExport;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Command::parse(std::env::args().skip(1))? {
        Command::Compile(options) => compile(&options),
        Command::Inspect { record, strict } => inspect(&record, strict),
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

fn read_record(path: &std::path::Path, strict: bool) -> Result<DecodedRecord> {
    if strict {
        Ok(DecodedRecord {
            record: load_record(path)?,
            rejected: Vec::new(),
        })
    } else {
        Ok(load_record_lenient(path)?)
    }
}

fn compile(options: &CompileOptions) -> Result<()> {
    let level_config = config::load_level_config(options)?;
    let decoded = read_record(&options.record, options.strict)
        .with_context(|| format!("Failed to read record {}", options.record.display()))?;

    let compiler = GeometryCompiler::new(level_config.build.clone());
    let level = compiler.compile(&decoded.record, level_config.board);

    let export = LevelExport::new(
        &level,
        level_config.board,
        decoded.record.len(),
        decoded.rejected.len(),
        options.combined,
    );
    let text = serde_json::to_string_pretty(&export).context("Failed to encode level")?;

    match &options.out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote level to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }
    Ok(())
}

fn inspect(path: &std::path::Path, strict: bool) -> Result<()> {
    let decoded = read_record(path, strict)
        .with_context(|| format!("Failed to read record {}", path.display()))?;
    let record = &decoded.record;

    let count = |tool: ToolKind| record.iter().filter(|s| s.tool() == tool).count();
    println!("{}", path.display());
    println!("  strokes:  {}", record.len());
    println!("  brush:    {}", count(ToolKind::Brush));
    println!("  line:     {}", count(ToolKind::Line));
    println!("  curve:    {}", count(ToolKind::Curve));
    println!("  points:   {}", record.point_count());
    if !decoded.rejected.is_empty() {
        println!("  rejected: {}", decoded.rejected.len());
    }
    Ok(())
}
