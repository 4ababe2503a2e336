//! Caller-owned cache of loaded strategy catalogs

use super::Catalog;
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug)]
struct CachedCatalog {
    catalog: Arc<Catalog>,
    modified: Option<SystemTime>,
}

/// Catalogs keyed by file path
///
/// An entry is reloaded when the file's modification time moves forward.
/// [`CatalogCache::invalidate`] forces a reload for writers that change a
/// catalog within the filesystem's timestamp granularity.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: RwLock<HashMap<PathBuf, CachedCatalog>>,
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl CatalogCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a catalog, loading it on first use or when the file changed
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Catalog>> {
        let path = path.as_ref();
        let modified = modified_time(path);

        if let Some(cached) = self.entries.read().get(path) {
            let stale = match (cached.modified, modified) {
                (Some(old), Some(new)) => new > old,
                _ => false,
            };
            if !stale {
                return Ok(Arc::clone(&cached.catalog));
            }
            debug!(path = %path.display(), "Catalog changed on disk, reloading");
        }

        let catalog = Arc::new(Catalog::load(path)?);
        self.entries.write().insert(
            path.to_path_buf(),
            CachedCatalog {
                catalog: Arc::clone(&catalog),
                modified,
            },
        );
        Ok(catalog)
    }

    /// Drop one cached catalog; returns whether it was cached
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) -> bool {
        self.entries.write().remove(path.as_ref()).is_some()
    }

    /// Drop every cached catalog
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached catalogs
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
