//! Recover a catalogued strategy id from block arguments

use super::StrategyCatalog;
use crate::preset::{CategoryBlock, Protocol};
use tracing::{debug, warn};

/// Sentinel shown when no catalogued strategy matches
pub const NO_STRATEGY: &str = "none";

/// Collapse whitespace (newlines included) to single spaces, lowercase, trim
pub fn normalize_args(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Compare two argument texts after normalization
///
/// Flag order matters: the same flags in a different order do not match.
pub fn args_match(a: &str, b: &str) -> bool {
    normalize_args(a) == normalize_args(b)
}

/// Find the first strategy of `category_key` whose canonical text matches
///
/// Uses `tcp_args` or `udp_args` depending on `protocol`. Empty input yields
/// `None`. A catalog entry that cannot be read is logged and skipped.
pub fn match_strategy_by_args<C: StrategyCatalog + ?Sized>(
    catalog: &C,
    category_key: &str,
    tcp_args: &str,
    udp_args: &str,
    protocol: Protocol,
) -> Option<String> {
    let target = match protocol {
        Protocol::Tcp => tcp_args,
        Protocol::Udp => udp_args,
    };
    let target = normalize_args(target);
    if target.is_empty() {
        return None;
    }

    for strategy_id in catalog.strategy_ids(category_key) {
        match catalog.strategy_args(category_key, &strategy_id) {
            Ok(args) if normalize_args(&args) == target => {
                debug!(category = category_key, strategy = %strategy_id, "Matched strategy");
                return Some(strategy_id);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(category = category_key, strategy = %strategy_id, "Skipping catalog entry: {e}");
            }
        }
    }

    None
}

/// Match a parsed block against the strategies of its own category
pub fn match_block<C: StrategyCatalog + ?Sized>(catalog: &C, block: &CategoryBlock) -> Option<String> {
    let (tcp_args, udp_args) = match block.protocol {
        Protocol::Tcp => (block.strategy_args.as_str(), ""),
        Protocol::Udp => ("", block.strategy_args.as_str()),
    };
    match_strategy_by_args(catalog, &block.category, tcp_args, udp_args, block.protocol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::strategy::MockStrategyCatalog;
    use mockall::predicate::eq;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_args("  --A=1\n\n  --b=2\t"), "--a=1 --b=2");
        assert!(args_match("--x  --y", "--X\n--Y"));
        assert!(!args_match("--x --y", "--y --x"));
    }

    #[test]
    fn test_failed_candidate_is_skipped() {
        let mut catalog = MockStrategyCatalog::new();
        catalog
            .expect_strategy_ids()
            .with(eq("cat"))
            .return_const(vec!["bad".to_string(), "good".to_string()]);
        catalog
            .expect_strategy_args()
            .with(eq("cat"), eq("bad"))
            .returning(|c, s| Err(Error::catalog_entry(c, s, "corrupt")));
        catalog
            .expect_strategy_args()
            .with(eq("cat"), eq("good"))
            .returning(|_, _| Ok("--dpi-desync=fake".to_string()));

        let found = match_strategy_by_args(&catalog, "cat", "--DPI-desync=fake ", "", Protocol::Tcp);
        assert_eq!(found.as_deref(), Some("good"));
    }

    #[test]
    fn test_empty_target_skips_catalog() {
        let mut catalog = MockStrategyCatalog::new();
        catalog.expect_strategy_ids().never();

        assert!(match_strategy_by_args(&catalog, "cat", "--a", "  \n", Protocol::Udp).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut catalog = MockStrategyCatalog::new();
        catalog
            .expect_strategy_ids()
            .return_const(vec!["first".to_string(), "second".to_string()]);
        catalog
            .expect_strategy_args()
            .returning(|_, _| Ok("--same".to_string()));

        let found = match_strategy_by_args(&catalog, "cat", "", "--same", Protocol::Udp);
        assert_eq!(found.as_deref(), Some("first"));
    }
}
