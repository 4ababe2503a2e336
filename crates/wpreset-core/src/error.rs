//! Error types for wpreset-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//! Malformed preset text never produces one of these; only file access and
//! settings/catalog loading do.

use thiserror::Error;

/// Main error type for wpreset-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Preset file does not exist
    #[error("Preset file not found: {path}")]
    PresetNotFound {
        /// Path to the missing preset
        path: String,
    },

    /// Preset file could not be written, even through the direct fallback
    #[error("Failed to write preset '{path}': {message}")]
    PresetWrite {
        /// Target path
        path: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Strategy catalog file not found
    #[error("Strategy catalog not found: {path}")]
    CatalogNotFound {
        /// Path to the missing catalog
        path: String,
    },

    /// A single catalog entry could not be resolved
    #[error("Catalog entry '{category}/{strategy}' is unusable: {message}")]
    CatalogEntry {
        /// Category key
        category: String,
        /// Strategy id
        strategy: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a catalog entry error
    pub fn catalog_entry(
        category: impl Into<String>,
        strategy: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CatalogEntry {
            category: category.into(),
            strategy: strategy.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the requested file is absent
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::PresetNotFound { .. }
            | Self::ConfigNotFound { .. }
            | Self::CatalogNotFound { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
