//! Response cache keyed by request key.
//!
//! Entries are never removed: a stale entry is simply ignored on read and
//! overwritten by the next fetch for the same key. Writes are last-write-wins,
//! so two concurrent misses for one key cost at most one redundant request.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::record::MetricRecord;

/// Default TTL for cached records (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// A cached record and the moment it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: MetricRecord,
    pub stored_at: Instant,
}

impl CacheEntry {
    fn new(key: String, payload: MetricRecord) -> Self {
        Self {
            key,
            payload,
            stored_at: Instant::now(),
        }
    }

    /// Age measured from the write, not from the last read.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Thread-safe TTL cache for metric records.
#[derive(Debug, Clone)]
pub struct MetricCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for MetricCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCache {
    /// Create a new cache with default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a new cache with specified TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Get a cached record if it is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<MetricRecord> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(self.ttl) {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Store a record, superseding whatever was there.
    pub fn insert(&self, key: impl Into<String>, payload: MetricRecord) {
        let key = key.into();
        let entry = CacheEntry::new(key.clone(), payload);
        self.entries.insert(key, entry);
    }

    /// Raw entry access, stale or not.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.clone())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let fresh_count = self
            .entries
            .iter()
            .filter(|e| e.value().is_fresh(self.ttl))
            .count();
        CacheStats {
            entry_count: self.len(),
            fresh_count,
            ttl_ms: u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entry_count: usize,
    pub fresh_count: usize,
    pub ttl_ms: u64,
}
