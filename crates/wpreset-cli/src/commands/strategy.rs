//! Strategy command - recover catalogued strategies for a preset

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use wpreset_core::strategy::NO_STRATEGY;
use wpreset_core::{match_block, parse_preset_file, Catalog, Config};

use super::resolve_preset;

/// Strategy command arguments
#[derive(Args, Debug)]
pub struct StrategyArgs {
    /// Preset file (default: the configured active preset)
    pub file: Option<PathBuf>,

    /// Strategy catalog (default: [catalog] path from config)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

/// Execute strategy command
pub fn execute(args: StrategyArgs, config: &Config) -> Result<()> {
    let catalog_path = args
        .catalog
        .or_else(|| config.catalog.path.as_deref().map(PathBuf::from))
        .context("No strategy catalog given; pass --catalog or set [catalog] path")?;

    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {:?}", catalog_path))?;

    let path = resolve_preset(args.file.as_deref(), config)?;
    let data = parse_preset_file(&path)
        .with_context(|| format!("Failed to load preset from {:?}", path))?;

    println!("{} {}", "Preset:".bright_white().bold(), data.name.cyan());
    println!("{}", "─".repeat(50).bright_black());

    for block in &data.categories {
        let label = format!("{}/{}", block.category, block.protocol);
        match match_block(&catalog, block) {
            Some(id) => {
                let name = catalog
                    .display_name(&block.category, &id)
                    .filter(|name| *name != id);
                match name {
                    Some(name) => println!("  {:<20} {} ({})", label, id.green(), name),
                    None => println!("  {:<20} {}", label, id.green()),
                }
            }
            None => println!("  {:<20} {}", label, NO_STRATEGY.dimmed()),
        }
    }

    Ok(())
}
