//! Format command - rewrite a preset in canonical form

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use wpreset_core::{generate_preset_content, parse_preset_file, save_preset_file, Config};

use super::resolve_preset;

/// Format command arguments
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Preset file (default: the configured active preset)
    pub file: Option<PathBuf>,

    /// Write to this file instead of rewriting the input
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Leave out the header comments (written directly, not atomically)
    #[arg(long)]
    pub no_header: bool,

    /// Write the target in place instead of replacing it atomically
    #[arg(long)]
    pub no_atomic: bool,
}

/// Execute format command
pub fn execute(args: FormatArgs, config: &Config) -> Result<()> {
    let path = resolve_preset(args.file.as_deref(), config)?;
    let data = parse_preset_file(&path)
        .with_context(|| format!("Failed to load preset from {:?}", path))?;

    let target = args.output.unwrap_or_else(|| path.clone());

    if args.no_header {
        std::fs::write(&target, generate_preset_content(&data, false))
            .with_context(|| format!("Failed to write preset to {:?}", target))?;
    } else {
        save_preset_file(&data, &target, !args.no_atomic)
            .with_context(|| format!("Failed to write preset to {:?}", target))?;
    }

    info!(source = %path.display(), target = %target.display(), "Formatted preset");
    println!(
        "{} {} ({} blocks)",
        "✓ Formatted".green(),
        target.display(),
        data.categories.len()
    );

    Ok(())
}
