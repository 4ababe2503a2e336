//! CLI commands

pub mod compile;
pub mod completions;
pub mod config;
pub mod format;
pub mod show;
pub mod strategy;

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use wpreset_core::Config;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the parsed blocks of a preset
    Show(show::ShowArgs),

    /// Rewrite a preset in canonical form, merging duplicate blocks
    Format(format::FormatArgs),

    /// Print the final winws argument list
    Compile(compile::CompileArgs),

    /// Recover catalogued strategy ids for each block
    Strategy(strategy::StrategyArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

const PRESET_EXTENSION: &str = "txt";

/// Locate the preset a command works on
///
/// An explicit path that does not exist is looked up in
/// `[general] presets_dir`. Without a path, `[general] active_preset` names
/// the preset inside that directory.
pub fn resolve_preset(file: Option<&Path>, config: &Config) -> Result<PathBuf> {
    let presets_dir = config.general.presets_dir.as_deref().map(PathBuf::from);

    if let Some(file) = file {
        if file.exists() || file.is_absolute() {
            return Ok(file.to_path_buf());
        }
        if let Some(candidate) = presets_dir.as_ref().map(|dir| dir.join(file)) {
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        return Ok(file.to_path_buf());
    }

    let Some(active) = config.general.active_preset.as_deref() else {
        bail!("No preset file given and no [general] active_preset configured");
    };

    let mut name = PathBuf::from(active);
    if name.extension().is_none() {
        name.set_extension(PRESET_EXTENSION);
    }
    Ok(match presets_dir {
        Some(dir) => dir.join(name),
        None => name,
    })
}
