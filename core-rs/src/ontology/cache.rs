//! Bounded LRU memo for the term/URI lookups of one ontology
//!
//! Keys are sanitized lookup arguments. Only successful lookups are stored.
//! `reconfigure` swaps in a fresh cache, so old entries never survive a
//! capacity change. A capacity of zero disables memoization.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::sync::RwLock;

pub struct LookupCache {
    capacity: RwLock<u64>,
    inner: RwLock<Option<Cache<String, String>>>,
}

impl LookupCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity: RwLock::new(capacity),
            inner: RwLock::new(Self::build(capacity)),
        }
    }

    fn build(capacity: u64) -> Option<Cache<String, String>> {
        if capacity == 0 {
            return None;
        }
        Some(
            Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        )
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.as_ref().and_then(|cache| cache.get(key))
    }

    pub fn insert(&self, key: String, value: String) {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cache) = inner.as_ref() {
            cache.insert(key, value);
            // Apply evictions now so the bound holds immediately
            cache.run_pending_tasks();
        }
    }

    /// Drop every entry and resize
    pub fn reconfigure(&self, capacity: u64) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut current = self.capacity.write().unwrap_or_else(|e| e.into_inner());
        if let Some(cache) = inner.as_ref() {
            cache.invalidate_all();
        }
        *inner = Self::build(capacity);
        *current = capacity;
    }

    pub fn capacity(&self) -> u64 {
        *self.capacity.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> u64 {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match inner.as_ref() {
            Some(cache) => {
                cache.run_pending_tasks();
                cache.entry_count()
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cache) = inner.as_ref() {
            cache.invalidate_all();
            cache.run_pending_tasks();
        }
    }
}

impl std::fmt::Debug for LookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupCache")
            .field("capacity", &self.capacity())
            .finish()
    }
}
