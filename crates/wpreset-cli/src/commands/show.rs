//! Show command - parsed view of a preset

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use wpreset_core::{parse_preset_file, Config, PresetData};

use super::resolve_preset;

/// Show command arguments
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Preset file (default: the configured active preset)
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// How the parsed preset is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON document
    Json,
    /// TOML document
    Toml,
}

/// Execute show command
pub fn execute(args: ShowArgs, config: &Config) -> Result<()> {
    let path = resolve_preset(args.file.as_deref(), config)?;
    let data = parse_preset_file(&path)
        .with_context(|| format!("Failed to load preset from {:?}", path))?;

    match args.format {
        OutputFormat::Text => print_summary(&data),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&data).context("Failed to serialize preset")?;
            println!("{}", json);
        }
        OutputFormat::Toml => {
            let toml_str = toml::to_string_pretty(&data).context("Failed to serialize preset")?;
            println!("{}", toml_str);
        }
    }

    Ok(())
}

fn print_summary(data: &PresetData) {
    println!("{}", "═".repeat(60).bright_blue());
    println!(" {} {}", "Preset:".bright_white().bold(), data.name.cyan());
    println!("{}", "═".repeat(60).bright_blue());

    if let Some(ref active) = data.active_preset {
        println!("Active preset: {}", active.cyan());
    }

    let base_lines = data.base_args.lines().count();
    println!("Base arguments: {} line(s)", base_lines.to_string().green());
    for line in data.base_args.lines() {
        println!("  {}", line.dimmed());
    }

    println!("Category blocks: {}", data.categories.len().to_string().green());
    println!("{}", "─".repeat(60).bright_black());

    if data.categories.is_empty() {
        println!("{}", "  (empty)".dimmed());
    }

    for (idx, block) in data.categories.iter().enumerate() {
        let target = if block.filter_file.is_empty() {
            block.filter_mode.to_string()
        } else {
            format!("{} {}", block.filter_mode, block.filter_file)
        };

        println!(
            "  {:>2}. {:<14} {:<4} {:<16} {}",
            idx + 1,
            block.category.bold(),
            block.protocol,
            block.port,
            target.dimmed()
        );
        for line in block.strategy_args.lines() {
            println!("        {}", line);
        }
        if let Some(ref syndata) = block.syndata_dict {
            let params: Vec<String> = syndata
                .iter()
                .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k}={v}") })
                .collect();
            println!("        {} {}", "syndata:".yellow(), params.join(", "));
        }
    }

    println!("{}", "═".repeat(60).bright_blue());
}
