//! # wpreset core
//!
//! Preset compiler for winws circumvention configurations.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Presets** - Parse, edit and write the preset text format
//! - **Token filters** - Idempotent rewrite passes over the final argument list
//! - **Strategy matching** - Recover a catalogued strategy id from block arguments
//! - **Configuration** - TOML settings for filters, catalogs and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use wpreset_core::{compile_preset, parse_preset_file, Config};
//!
//! let config = Config::load("wpreset.toml")?;
//! let preset = parse_preset_file("presets/default.txt")?;
//!
//! // Arguments for the winws process
//! let args = compile_preset(&preset, &config.filters);
//! # Ok::<(), wpreset_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod compile;
pub mod config;
pub mod error;
pub mod filter;
pub mod preset;
pub mod strategy;

// Re-exports for convenience
pub use compile::{build_command_line, compile_preset, tokenize_args};
pub use config::{Config, FilterSettings};
pub use error::{Error, Result};
pub use filter::{apply_all_filters, FilterPipeline, FilterToggles};
pub use preset::{
    generate_preset_content, generate_preset_file, parse_preset_content, parse_preset_file,
    save_preset_file, CategoryBlock, FilterMode, PresetData, Protocol,
};
pub use strategy::{match_block, match_strategy_by_args, Catalog, CatalogCache, StrategyCatalog};
