//! Port-set expressions used by `--filter-tcp=` / `--filter-udp=`
//!
//! Grammar: comma-separated entries, each a port, an inclusive `start-end`
//! range, or the wildcard `*`. Malformed entries are skipped.

use tracing::debug;

/// One entry of a port set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortEntry {
    /// A single port
    Single(u16),
    /// Inclusive range
    Range(u16, u16),
    /// `*`
    Any,
}

impl PortEntry {
    fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry == "*" {
            return Some(PortEntry::Any);
        }
        match entry.split_once('-') {
            Some((start, end)) => {
                let start = start.trim().parse().ok()?;
                let end = end.trim().parse().ok()?;
                Some(PortEntry::Range(start, end))
            }
            None => entry.parse().ok().map(PortEntry::Single),
        }
    }
}

/// Parsed port-set expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    entries: Vec<PortEntry>,
}

impl PortSet {
    /// Parse a port-set expression, dropping entries that do not parse
    pub fn parse(spec: &str) -> Self {
        let entries = spec
            .split(',')
            .filter(|e| !e.trim().is_empty())
            .filter_map(|e| {
                let parsed = PortEntry::parse(e);
                if parsed.is_none() {
                    debug!(entry = e, spec, "Skipping malformed port entry");
                }
                parsed
            })
            .collect();
        Self { entries }
    }

    /// Parsed entries in source order
    pub fn entries(&self) -> &[PortEntry] {
        &self.entries
    }

    /// Whether the set has no usable entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `*` appears in the set
    pub fn has_wildcard(&self) -> bool {
        self.entries.contains(&PortEntry::Any)
    }

    /// Whether the set explicitly lists `port`; `*` does not count
    pub fn contains(&self, port: u16) -> bool {
        self.contains_with_wildcard(port, false)
    }

    /// Like [`PortSet::contains`], with `*` counting as every port when
    /// `wildcard_matches` is set
    pub fn contains_with_wildcard(&self, port: u16, wildcard_matches: bool) -> bool {
        self.entries.iter().any(|entry| match *entry {
            PortEntry::Single(p) => p == port,
            PortEntry::Range(start, end) => (start..=end).contains(&port),
            PortEntry::Any => wildcard_matches,
        })
    }
}
