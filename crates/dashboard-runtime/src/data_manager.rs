//! Memoized dataset loading.
//!
//! [`DatasetCache`] keeps one loaded table per source path, shared as an
//! `Arc<Vec<T>>` that nobody mutates. Entries optionally expire after a
//! time-to-live. [`DataManager`] bundles the RA and GDP caches behind the
//! loaders in `dashboard-data`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashboard_core::error::Result;
use dashboard_core::models::{GdpRecord, NormalizedRecord};
use dashboard_data::gdp::pivot_gdp;
use dashboard_data::reader::normalize;

// ── DatasetCache ──────────────────────────────────────────────────────────────

struct CacheEntry<T> {
    data: Arc<Vec<T>>,
    loaded_at: Instant,
}

/// Path-keyed memo of loaded tables.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use dashboard_runtime::data_manager::DatasetCache;
///
/// let mut cache = DatasetCache::new(None);
/// let records = cache
///     .get_or_load(Path::new("data/all_nbly_Jan2025.csv"), dashboard_data::normalize)
///     .unwrap();
/// println!("{} records", records.len());
/// ```
pub struct DatasetCache<T> {
    /// Maximum age before an entry is reloaded; `None` never expires.
    ttl: Option<Duration>,
    entries: HashMap<PathBuf, CacheEntry<T>>,
}

impl<T> DatasetCache<T> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Return the table for `path`, calling `loader` on a miss or when the
    /// cached entry is stale.
    ///
    /// A loader error is returned unchanged and leaves any previous entry
    /// for `path` evicted.
    pub fn get_or_load<F>(&mut self, path: &Path, loader: F) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce(&Path) -> Result<Vec<T>>,
    {
        let key = cache_key(path);

        if let Some(entry) = self.entries.get(&key) {
            if self.is_fresh(entry) {
                tracing::debug!(path = %key.display(), "returning cached dataset");
                return Ok(Arc::clone(&entry.data));
            }
            tracing::debug!(path = %key.display(), "cached dataset is stale");
        }

        self.entries.remove(&key);
        let data = Arc::new(loader(path)?);
        tracing::debug!(path = %key.display(), rows = data.len(), "dataset cache updated");
        self.entries.insert(
            key,
            CacheEntry {
                data: Arc::clone(&data),
                loaded_at: Instant::now(),
            },
        );
        Ok(data)
    }

    /// Drop the entry for `path`. Returns `true` when one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.entries.remove(&cache_key(path)).is_some();
        if removed {
            tracing::debug!(path = %path.display(), "cache entry invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Age of the entry for `path`, or `None` if nothing is cached.
    pub fn age(&self, path: &Path) -> Option<Duration> {
        self.entries
            .get(&cache_key(path))
            .map(|e| e.loaded_at.elapsed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
        match self.ttl {
            Some(ttl) => entry.loaded_at.elapsed() < ttl,
            None => true,
        }
    }
}

/// Canonical path when it resolves, the path as given otherwise.
fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Cached access to both dashboard datasets.
pub struct DataManager {
    ra: DatasetCache<NormalizedRecord>,
    gdp: DatasetCache<GdpRecord>,
}

impl DataManager {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ra: DatasetCache::new(ttl),
            gdp: DatasetCache::new(ttl),
        }
    }

    /// Normalized RA records for `path`.
    pub fn ra_records(&mut self, path: &Path) -> Result<Arc<Vec<NormalizedRecord>>> {
        self.ra.get_or_load(path, normalize)
    }

    /// Pivoted GDP records for `path`.
    pub fn gdp_records(&mut self, path: &Path) -> Result<Arc<Vec<GdpRecord>>> {
        self.gdp.get_or_load(path, pivot_gdp)
    }

    /// Forget every cached dataset.
    pub fn invalidate_all(&mut self) {
        self.ra.clear();
        self.gdp.clear();
        tracing::debug!("all dataset caches invalidated");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
