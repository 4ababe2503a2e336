//! Strategy catalogs
//!
//! A catalog maps category keys to named strategies and their canonical
//! argument text. The TOML form accepts either a bare string or a table:
//!
//! ```toml
//! [categories.youtube]
//! split_pos1 = "--lua-desync=split:pos=1"
//!
//! [categories.youtube.fake_tls]
//! name = "Fake TLS + multisplit"
//! args = """
//! --dpi-desync=fake,multisplit
//! --dpi-desync-fake-tls=tls_clienthello.bin
//! """
//! ```
//!
//! Entries are resolved lazily so that one malformed entry does not make the
//! whole catalog unusable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use toml::Value;
use tracing::info;

/// Read-only source of canonical strategy arguments
#[cfg_attr(test, mockall::automock)]
pub trait StrategyCatalog {
    /// Strategy ids known for a category, in matching order
    fn strategy_ids(&self, category: &str) -> Vec<String>;

    /// Canonical argument text of one strategy
    fn strategy_args(&self, category: &str, strategy_id: &str) -> Result<String>;
}

/// TOML-backed strategy catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// category key → strategy id → entry
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Catalog {
    /// Load a catalog from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::CatalogNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml(&content)?;
        info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            "Loaded strategy catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(Error::from)
    }

    /// Add or replace a strategy with plain argument text
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        strategy_id: impl Into<String>,
        args: impl Into<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(strategy_id.into(), Value::String(args.into()));
    }

    /// Category keys in sorted order
    pub fn category_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Human-readable name of a strategy, falling back to its id
    pub fn display_name(&self, category: &str, strategy_id: &str) -> Option<String> {
        let entry = self.categories.get(category)?.get(strategy_id)?;
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(strategy_id);
        Some(name.to_string())
    }
}

impl StrategyCatalog for Catalog {
    fn strategy_ids(&self, category: &str) -> Vec<String> {
        self.categories
            .get(category)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn strategy_args(&self, category: &str, strategy_id: &str) -> Result<String> {
        let entry = self
            .categories
            .get(category)
            .and_then(|entries| entries.get(strategy_id))
            .ok_or_else(|| Error::catalog_entry(category, strategy_id, "no such strategy"))?;

        match entry {
            Value::String(args) => Ok(args.clone()),
            Value::Table(table) => match table.get("args") {
                Some(Value::String(args)) => Ok(args.clone()),
                Some(_) => Err(Error::catalog_entry(category, strategy_id, "'args' is not a string")),
                None => Err(Error::catalog_entry(category, strategy_id, "missing 'args'")),
            },
            other => Err(Error::catalog_entry(
                category,
                strategy_id,
                format!("expected string or table, found {}", other.type_str()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[categories.youtube]
split = "--lua-desync=split:pos=1"
broken = 42

[categories.youtube.fake]
name = "Fake TLS"
args = "--dpi-desync=fake"

[categories.youtube.noargs]
name = "Nothing here"
"#;

    #[test]
    fn test_parse_and_lookup() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();
        assert_eq!(
            catalog.strategy_ids("youtube"),
            vec!["broken", "fake", "noargs", "split"]
        );
        assert_eq!(
            catalog.strategy_args("youtube", "split").unwrap(),
            "--lua-desync=split:pos=1"
        );
        assert_eq!(catalog.strategy_args("youtube", "fake").unwrap(), "--dpi-desync=fake");
    }

    #[test]
    fn test_malformed_entries() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();
        assert!(catalog.strategy_args("youtube", "broken").is_err());
        assert!(catalog.strategy_args("youtube", "noargs").is_err());
        assert!(catalog.strategy_args("youtube", "missing").is_err());
        assert!(catalog.strategy_ids("discord").is_empty());
    }

    #[test]
    fn test_display_name() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.display_name("youtube", "fake").as_deref(), Some("Fake TLS"));
        assert_eq!(catalog.display_name("youtube", "split").as_deref(), Some("split"));
        assert!(catalog.display_name("youtube", "missing").is_none());
    }

    #[test]
    fn test_insert_roundtrip() {
        let mut catalog = Catalog::default();
        catalog.insert("discord", "s1", "--dpi-desync=fake");
        let toml = catalog.to_toml().unwrap();
        let parsed = Catalog::from_toml(&toml).unwrap();
        assert_eq!(catalog, parsed);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Catalog::from_toml("[categories\nbad").is_err());
    }
}
