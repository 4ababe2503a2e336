//! wpreset CLI
//!
//! Command-line front end for inspecting, normalizing and compiling winws
//! presets.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use args::Args;
use commands::Command;
use wpreset_core::Config;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Settings feed both logging and the commands
    let (config, config_path) = commands::config::load_config(args.config.as_deref())?;

    // Initialize logging
    logging::init(&args, &config.logging)?;

    match config_path {
        Some(path) => debug!(path = %path.display(), "Using configuration file"),
        None => debug!("No configuration file found, using defaults"),
    }

    // Run the main logic
    let result = run(args, &config);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args, config: &Config) -> Result<()> {
    match args.command {
        Command::Show(show_args) => commands::show::execute(show_args, config),
        Command::Format(format_args) => commands::format::execute(format_args, config),
        Command::Compile(compile_args) => commands::compile::execute(compile_args, config),
        Command::Strategy(strategy_args) => commands::strategy::execute(strategy_args, config),
        Command::Config(config_args) => commands::config::execute(config_args, config),
        Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}
