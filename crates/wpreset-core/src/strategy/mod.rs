//! Strategy catalogs and reverse lookup
//!
//! Given the behavioural part of a category block, find which catalogued
//! strategy produced it. Matching is whitespace- and case-insensitive but
//! otherwise exact.

mod cache;
mod catalog;
mod matcher;

pub use cache::CatalogCache;
pub use catalog::{Catalog, StrategyCatalog};
pub use matcher::{args_match, match_block, match_strategy_by_args, normalize_args, NO_STRATEGY};

#[cfg(test)]
pub(crate) use catalog::MockStrategyCatalog;
