//! Configuration management for wpreset
//!
//! Strongly-typed settings with TOML support: where presets live, which
//! token filters run before launch, and which strategy catalog to match
//! against.

use crate::error::{Error, Result};
use crate::filter::FilterToggles;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log levels accepted in `[logging] level`
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General application settings
    pub general: GeneralConfig,

    /// Token filter toggles
    pub filters: FilterSettings,

    /// Strategy catalog location
    pub catalog: CatalogConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config_value(
                "logging.level",
                format!("Unknown level '{}', expected one of {}", self.logging.level, LOG_LEVELS.join(", ")),
            ));
        }

        if let Some(ref path) = self.catalog.path {
            if path.trim().is_empty() {
                return Err(Error::config_value("catalog.path", "Must not be empty when set"));
            }
        }

        if let Some(ref dir) = self.general.presets_dir {
            if dir.trim().is_empty() {
                return Err(Error::config_value("general.presets_dir", "Must not be empty when set"));
            }
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// General application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding preset files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presets_dir: Option<String>,
    /// Preset selected at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_preset: Option<String>,
}

/// Toggles for the token filter passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Drop all hostlist targeting
    pub remove_hostlists: bool,
    /// Drop all ipset targeting
    pub remove_ipsets: bool,
    /// Use allzone.txt in place of other.txt
    pub allzone: bool,
    /// Inject `--wssize 1:6` into TCP/443 blocks
    pub wssize: bool,
    /// Count port spec `*` as including 443
    pub wildcard_port_matches: bool,
}

impl FilterToggles for FilterSettings {
    fn remove_hostlists(&self) -> bool {
        self.remove_hostlists
    }

    fn remove_ipsets(&self) -> bool {
        self.remove_ipsets
    }

    fn allzone(&self) -> bool {
        self.allzone
    }

    fn wssize(&self) -> bool {
        self.wssize
    }

    fn wildcard_port_matches(&self) -> bool {
        self.wildcard_port_matches
    }
}

/// Strategy catalog settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a TOML strategy catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON format logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
