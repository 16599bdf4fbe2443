//! In-process cache backend with per-key expiry.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use converter_types::{CacheBackend, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Concurrent string cache. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until next read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();

        // Clone out and release the shard guard before any removal.
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at));

        match found {
            Some((value, expires_at)) if expires_at > now => {
                debug!(key, "Cache HIT");
                Ok(Some(value))
            }
            Some(_) => {
                debug!(key, "Cache entry expired");
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                Ok(None)
            }
            None => {
                debug!(key, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        debug!(key, ttl_secs = ttl.as_secs(), "Cache PUT");
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        debug!("Cache FLUSHALL");
        self.entries.clear();
        Ok(())
    }
}
