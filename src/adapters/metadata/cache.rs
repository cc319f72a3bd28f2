//! Metadata Cache
//!
//! TTL cache for resolved mint metadata. TTL and capacity are injected at
//! construction and invalidation is explicit, keeping the enrichment path
//! deterministic under test.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::ports::metadata::TokenMeta;

/// Cache entry with TTL tracking
#[derive(Debug, Clone)]
struct CacheEntry {
    meta: TokenMeta,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_valid(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// TTL cache keyed by mint address
#[derive(Debug)]
pub struct MetadataCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl MetadataCache {
    /// Default entry lifetime (10 minutes)
    pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
    /// Default max cache entries
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_TTL, Self::DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache with injected TTL and capacity
    pub fn with_config(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn insert(&mut self, mint: impl Into<String>, meta: TokenMeta) {
        if self.entries.len() >= self.max_entries {
            self.cleanup();
        }
        if self.entries.len() >= self.max_entries {
            self.remove_oldest();
        }

        self.entries.insert(
            mint.into(),
            CacheEntry {
                meta,
                inserted_at: Instant::now(),
                ttl: self.ttl,
            },
        );
    }

    /// Get a cached entry if still valid
    pub fn get(&self, mint: &str) -> Option<&TokenMeta> {
        self.entries
            .get(mint)
            .filter(|entry| entry.is_valid())
            .map(|entry| &entry.meta)
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.get(mint).is_some()
    }

    /// Explicitly drop one entry
    pub fn invalidate(&mut self, mint: &str) -> Option<TokenMeta> {
        self.entries.remove(mint).map(|e| e.meta)
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries
    pub fn cleanup(&mut self) {
        self.entries.retain(|_, entry| entry.is_valid());
    }

    fn remove_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
