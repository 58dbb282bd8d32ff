//! Thread-safe memoization of nearest-symbol resolutions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(feature = "dashmap-cache")]
use dashmap::DashMap;

#[cfg(not(feature = "dashmap-cache"))]
use parking_lot::RwLock;
#[cfg(not(feature = "dashmap-cache"))]
use rustc_hash::FxHashMap;

/// Input symbol → resolved in-inventory symbol.
///
/// Uses either `DashMap` (feature "dashmap-cache") or
/// `RwLock<FxHashMap>` for concurrent access. Entries are never evicted and
/// the first value stored for a key is kept: concurrent resolutions of the
/// same key compute the same value, so a lost insert is only redundant work.
pub struct NearestCache {
    #[cfg(feature = "dashmap-cache")]
    cache: DashMap<Arc<str>, Arc<str>>,

    #[cfg(not(feature = "dashmap-cache"))]
    cache: RwLock<FxHashMap<Arc<str>, Arc<str>>>,

    searches: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl NearestCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "dashmap-cache")]
            cache: DashMap::new(),

            #[cfg(not(feature = "dashmap-cache"))]
            cache: RwLock::new(FxHashMap::default()),

            searches: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    /// Cached resolution for `key`.
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        #[cfg(feature = "dashmap-cache")]
        {
            self.cache.get(key).map(|entry| Arc::clone(entry.value()))
        }

        #[cfg(not(feature = "dashmap-cache"))]
        {
            self.cache.read().get(key).cloned()
        }
    }

    /// Store `value` for `key` unless a value is already present.
    ///
    /// Returns the value that ends up in the cache.
    pub fn insert(&self, key: &str, value: Arc<str>) -> Arc<str> {
        #[cfg(feature = "dashmap-cache")]
        {
            Arc::clone(self.cache.entry(Arc::from(key)).or_insert(value).value())
        }

        #[cfg(not(feature = "dashmap-cache"))]
        {
            Arc::clone(self.cache.write().entry(Arc::from(key)).or_insert(value))
        }
    }

    /// Record that a full similarity search was performed.
    #[inline]
    pub(crate) fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of full similarity searches performed so far.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }

    /// Record that a search found no features to compare and took the first
    /// candidate.
    #[inline]
    pub(crate) fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of searches that fell back to the first candidate.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        #[cfg(feature = "dashmap-cache")]
        {
            self.cache.len()
        }

        #[cfg(not(feature = "dashmap-cache"))]
        {
            self.cache.read().len()
        }
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NearestCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NearestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestCache")
            .field("len", &self.len())
            .field("searches", &self.searches())
            .field("fallbacks", &self.fallbacks())
            .finish()
    }
}
