use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::source::Lookup;

/// Thread-safe LRU cache for article lookups
///
/// Keeps resolved titles across crawls so repeated or overlapping crawls do
/// not hit the encyclopedia service again. Transient failures
/// (`NotFoundReason::Unavailable`) are never stored.
pub struct ArticleCache {
    cache: Mutex<LruCache<String, Lookup>>,
}

impl ArticleCache {
    /// Create a new article cache with the specified capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of lookups to cache (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Get a cached lookup for a title
    pub fn get(&self, title: &str) -> Option<Lookup> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(title)
            .cloned()
    }

    /// Store a lookup in the cache
    ///
    /// Returns `false` when the lookup is a transient failure and was not stored.
    pub fn put(&self, title: String, lookup: Lookup) -> bool {
        if matches!(lookup, Lookup::NotFound(crate::source::NotFoundReason::Unavailable)) {
            return false;
        }
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(title, lookup);
        true
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
