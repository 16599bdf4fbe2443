//! Key/value cache port.

use std::time::Duration;

use crate::error::CacheError;

/// A string key/value store with per-key expiry.
///
/// Backends report their own failures; deciding that a failure means
/// "miss" or "not written" is left to the caller.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drops every key. Test teardown only.
    async fn flush_all(&self) -> Result<(), CacheError>;
}
