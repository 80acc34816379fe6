use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::key::CacheKey;

/// Key/value cache with per-entry TTL.
///
/// The document service treats every error from this trait as advisory: a
/// failed read is a miss and a failed write or delete is logged and dropped.
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get the value for a key. Returns `None` if absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Set a value with an optional TTL, overwriting any previous value.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Delete every given key. Returns how many of them existed.
    async fn delete(&self, keys: &[CacheKey]) -> Result<u64, CacheError>;
}
