//! Preset documents
//!
//! A preset is a text file holding a header of `#` comments, a run of shared
//! base arguments, and an ordered list of category blocks separated by
//! standalone `--new` lines. This module holds the in-memory model; parsing
//! and writing live in the submodules.

mod extract;
mod parser;
mod writer;

pub use extract::{
    extract_category_from_args, extract_protocol_and_port, extract_strategy_args,
    extract_syndata,
};
pub use parser::{parse_preset_content, parse_preset_file};
pub use writer::{generate_preset_content, generate_preset_file, save_preset_file, ReplaceRetry};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Name used when a document carries no name directive
pub const DEFAULT_PRESET_NAME: &str = "Unnamed";

/// Category used when none can be inferred from a block
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Port set assumed when a block has no filter flag
pub const DEFAULT_PORT: &str = "443";

/// Transport protocol a block targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `--filter-tcp`
    #[default]
    Tcp,
    /// `--filter-udp` or `--filter-l7`
    Udp,
}

impl Protocol {
    /// Lowercase name as used in presets and catalogs
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!("Unknown protocol: {other}")),
        }
    }
}

/// Which targeting flag family a block uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// `--hostlist=` / `--hostlist-domains=`
    Hostlist,
    /// `--ipset=` / `--ipset-ip=`
    Ipset,
    /// No targeting flag
    #[default]
    #[serde(rename = "")]
    None,
}

impl FilterMode {
    /// Name as it appears in serialized output; empty for [`FilterMode::None`]
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::Hostlist => "hostlist",
            FilterMode::Ipset => "ipset",
            FilterMode::None => "",
        }
    }

    /// Whether a targeting flag was found
    pub fn is_none(self) -> bool {
        self == FilterMode::None
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One traffic-shaping unit of a preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBlock {
    /// Short name inferred from the list file, `"unknown"` if none
    pub category: String,
    /// Protocol inferred from the filter flag
    pub protocol: Protocol,
    /// Targeting flag family
    pub filter_mode: FilterMode,
    /// Raw path argument of `--hostlist=` / `--ipset=`, empty if none
    pub filter_file: String,
    /// Verbatim port-set expression (or l7 spec)
    pub port: String,
    /// Full block text, one argument line per line
    pub args: String,
    /// `args` without filter and targeting lines
    pub strategy_args: String,
    /// Parsed `--syndata=` parameters, if the block has any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syndata_dict: Option<BTreeMap<String, String>>,
}

impl CategoryBlock {
    /// Build an annotated block from raw block text
    ///
    /// Runs the field extractors in the same order the parser does. A block
    /// without any targeting flag is treated as a hostlist block.
    pub fn from_args(args: impl Into<String>) -> Self {
        let args = args.into();
        let (category, mut filter_mode, filter_file) = extract_category_from_args(&args);
        let (protocol, port) = extract_protocol_and_port(&args);
        let strategy_args = extract_strategy_args(&args);
        let syndata_dict = extract_syndata(&args);

        if filter_mode.is_none() {
            filter_mode = FilterMode::Hostlist;
        }

        Self {
            category,
            protocol,
            filter_mode,
            filter_file,
            port,
            args,
            strategy_args,
            syndata_dict,
        }
    }

    /// Identity key used for lookup and deduplication
    pub fn key(&self) -> (&str, Protocol) {
        (self.category.as_str(), self.protocol)
    }
}

/// A parsed preset document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetData {
    /// Preset name from the `Preset:` (or legacy `Strategy:`) directive
    pub name: String,
    /// Sibling preset marked active by the `ActivePreset:` directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_preset: Option<String>,
    /// Lines shared by every block, before the first filter flag
    pub base_args: String,
    /// Category blocks in document order
    pub categories: Vec<CategoryBlock>,
    /// Leading comment region as read, reproduced verbatim on write
    ///
    /// When empty, a header is synthesized from `name` and `active_preset`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_header: String,
}

impl Default for PresetData {
    fn default() -> Self {
        Self {
            name: DEFAULT_PRESET_NAME.to_string(),
            active_preset: None,
            base_args: String::new(),
            categories: Vec::new(),
            raw_header: String::new(),
        }
    }
}

impl PresetData {
    /// Create an empty preset with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find the block for a category/protocol pair
    pub fn get_category_block(&self, category: &str, protocol: Protocol) -> Option<&CategoryBlock> {
        self.categories
            .iter()
            .find(|b| b.category == category && b.protocol == protocol)
    }

    /// Collapse blocks sharing an identity key
    ///
    /// The surviving block sits in the slot where its key first appeared and
    /// carries the content of the last block with that key.
    pub fn deduplicate_categories(&mut self) {
        let mut slots: HashMap<(String, Protocol), usize> = HashMap::new();
        let mut merged: Vec<CategoryBlock> = Vec::with_capacity(self.categories.len());

        for block in self.categories.drain(..) {
            let key = (block.category.clone(), block.protocol);
            match slots.get(&key) {
                Some(&slot) => {
                    debug!(
                        category = %block.category,
                        protocol = %block.protocol,
                        "Later block overrides earlier duplicate"
                    );
                    merged[slot] = block;
                }
                None => {
                    slots.insert(key, merged.len());
                    merged.push(block);
                }
            }
        }

        self.categories = merged;
    }

    /// Replace the block with the same key in place, or append it
    pub fn upsert_category_block(&mut self, block: CategoryBlock) {
        let existing = self
            .categories
            .iter()
            .position(|b| b.key() == block.key());

        match existing {
            Some(idx) => self.categories[idx] = block,
            None => self.categories.push(block),
        }
    }

    /// Remove and return the block for a category/protocol pair
    pub fn remove_category_block(
        &mut self,
        category: &str,
        protocol: Protocol,
    ) -> Option<CategoryBlock> {
        let idx = self
            .categories
            .iter()
            .position(|b| b.category == category && b.protocol == protocol)?;
        Some(self.categories.remove(idx))
    }

    /// Move a block to a new position; returns `false` if either index is out of range
    pub fn move_category_block(&mut self, from: usize, to: usize) -> bool {
        let len = self.categories.len();
        if from >= len || to >= len {
            return false;
        }
        let block = self.categories.remove(from);
        self.categories.insert(to, block);
        true
    }
}
