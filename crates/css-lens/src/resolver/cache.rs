use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use dashmap::DashMap;
use tracing::debug;

use crate::css::ClassIndex;

pub const DEFAULT_CACHE_ENTRIES: usize = 64;

/// Hash of a stylesheet's text, used to detect edits between keystrokes.
pub fn content_hash(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct CacheEntry {
    content_hash: u64,
    index: Arc<ClassIndex>,
    last_used: u64,
}

/// Memoized extractor output keyed by `(stylesheet path, content hash)`.
///
/// Holds at most one entry per path: a different hash for the same path
/// replaces the entry. When full, the least recently used path is evicted.
#[derive(Debug)]
pub struct ExtractionCache {
    entries: DashMap<PathBuf, CacheEntry>,
    max_entries: AtomicUsize,
    clock: AtomicU64,
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ENTRIES)
    }
}

impl ExtractionCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: AtomicUsize::new(max_entries.max(1)),
            clock: AtomicU64::new(0),
        }
    }

    pub fn get(
        &self,
        path: &Path,
        content_hash: u64,
    ) -> Option<Arc<ClassIndex>> {
        let mut entry = self.entries.get_mut(path)?;
        if entry.content_hash != content_hash {
            return None;
        }
        entry.last_used = self.tick();
        debug!("[extract-cache] hit {}", path.display());
        Some(Arc::clone(&entry.index))
    }

    pub fn insert(
        &self,
        path: PathBuf,
        content_hash: u64,
        index: Arc<ClassIndex>,
    ) {
        if !self.entries.contains_key(&path) {
            self.evict_to(self.max_entries().saturating_sub(1));
        }
        let last_used = self.tick();
        self.entries.insert(
            path,
            CacheEntry {
                content_hash,
                index,
                last_used,
            },
        );
    }

    pub fn invalidate(
        &self,
        path: &Path,
    ) {
        self.entries.remove(path);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.load(Ordering::Relaxed)
    }

    pub fn set_max_entries(
        &self,
        max_entries: usize,
    ) {
        let max_entries = max_entries.max(1);
        self.max_entries.store(max_entries, Ordering::Relaxed);
        self.evict_to(max_entries);
    }

    fn evict_to(
        &self,
        limit: usize,
    ) {
        while self.entries.len() > limit {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else {
                break;
            };
            debug!("[extract-cache] evict {}", oldest.display());
            self.entries.remove(&oldest);
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
#[path = "../../tests/src/resolver/cache_tests.rs"]
mod tests;
