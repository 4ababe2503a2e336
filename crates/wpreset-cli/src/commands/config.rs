//! Config command - configuration management

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;
use wpreset_core::Config;

const CONFIG_FILE_NAME: &str = "wpreset.toml";
const APP_NAME: &str = "wpreset";

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Config file to show (default: the one in use)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with default settings
    Generate {
        /// Output file path
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file, config),
        ConfigAction::Generate { output, force } => generate_config(output, force),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Paths => show_paths(),
    }
}

/// Load the settings for this invocation
///
/// An explicit path must exist. Otherwise the search paths are tried in
/// order and defaults are used when none exists. The file that was read is
/// returned alongside the settings; logging is not up yet at this point.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => return Ok((Config::default(), None)),
        },
    };

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {:?}", path))?;
    Ok((config, Some(path)))
}

fn show_config(file: Option<PathBuf>, config: &Config) -> Result<()> {
    let toml_str = match file {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?
            .to_toml(),
        None => config.to_toml(),
    }
    .context("Failed to serialize config")?;

    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists, use --force to overwrite", output.display());
    }

    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    // Add header comment
    let content = format!(
        "# wpreset configuration\n\
         # [filters] toggles apply to `wpreset compile`; [catalog] path is used by `wpreset strategy`\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    info!("Generated config file: {:?}", output);
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {:?}", file))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    let filters = &config.filters;
    println!("{}", "✓ Configuration is valid".green());
    println!("  Remove hostlists: {}", filters.remove_hostlists);
    println!("  Remove ipsets: {}", filters.remove_ipsets);
    println!("  Allzone: {}", filters.allzone);
    println!("  wssize: {}", filters.wssize);
    println!(
        "  Catalog: {}",
        config.catalog.path.as_deref().unwrap_or("(none)")
    );

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    println!("  1. ./{}", CONFIG_FILE_NAME);

    if let Some(dirs) = directories::ProjectDirs::from("", "", APP_NAME) {
        println!("  2. {}", dirs.config_dir().join(CONFIG_FILE_NAME).display());
    }

    Ok(())
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    // Check user config directory
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
