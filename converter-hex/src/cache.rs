//! Rate cache policy over a [`CacheBackend`].
//!
//! The backend reports its failures; this wrapper swallows them. A failed
//! read is a miss and a failed write is "not cached", so a broken cache only
//! costs extra provider calls.

use converter_types::CacheBackend;
use std::time::Duration;

pub struct RateCache<B: CacheBackend> {
    backend: B,
}

impl<B: CacheBackend> RateCache<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the cached value, or `None` on a miss or backend failure.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "Cache get failed, treating as miss");
                None
            }
        }
    }

    /// Stores `value` for `ttl_secs` seconds. Returns `false` if the write failed.
    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        match self
            .backend
            .set(key, value, Duration::from_secs(ttl_secs))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "Cache set failed");
                false
            }
        }
    }
}
