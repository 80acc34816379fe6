//! Best-effort access to the read-through cache.
//!
//! Nothing in this module returns an error. Failed reads count as misses;
//! failed writes and deletes are logged and counted, then dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use docvault_cache::{Cache, CacheKey};
use docvault_core::Login;

use crate::metrics::ServiceMetrics;

pub(crate) struct CacheLayer {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    metrics: Arc<ServiceMetrics>,
}

impl CacheLayer {
    pub(crate) fn new(cache: Arc<dyn Cache>, ttl: Duration, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            cache,
            ttl,
            metrics,
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read `key`. A backend error or an empty value is a miss.
    pub(crate) async fn lookup(&self, key: &CacheKey) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(value)) if !value.is_empty() => {
                self.metrics.increment_cache_hits();
                Some(value)
            }
            Ok(_) => {
                self.metrics.increment_cache_misses();
                None
            }
            Err(e) => {
                warn!(error = %e, key = %key, "cache read failed, treating as miss");
                self.metrics.increment_cache_errors();
                self.metrics.increment_cache_misses();
                None
            }
        }
    }

    /// Write `value` under `key` with the configured TTL.
    pub(crate) async fn store(&self, key: &CacheKey, value: &str) {
        if let Err(e) = self.cache.set(key, value, Some(self.ttl)).await {
            warn!(error = %e, key = %key, "cache write failed");
            self.metrics.increment_cache_errors();
        }
    }

    /// Cache a list result for `login` and record its key in that login's
    /// index so a later invalidation can find it.
    pub(crate) async fn store_list(&self, login: &Login, key: &CacheKey, value: &str) {
        self.store(key, value).await;

        // Concurrent misses for one login can drop an index entry; the list
        // entry then lives until its TTL.
        let index_key = CacheKey::user_docs(login);
        let mut indexed = self.read_index(&index_key).await;
        if !indexed.contains(key) {
            indexed.push(key.clone());
        }
        match serde_json::to_string(&indexed) {
            Ok(raw) => self.store(&index_key, &raw).await,
            Err(e) => warn!(error = %e, login = %login, "list index serialization failed"),
        }
    }

    /// Delete `keys`. Every [`CacheKey::UserDocs`] key also removes the list
    /// entries recorded in that index.
    pub(crate) async fn invalidate(&self, keys: &[CacheKey]) {
        let mut expanded: Vec<CacheKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if matches!(key, CacheKey::UserDocs { .. }) {
                for indexed in self.read_index(key).await {
                    if !expanded.contains(&indexed) {
                        expanded.push(indexed);
                    }
                }
            }
            if !expanded.contains(key) {
                expanded.push(key.clone());
            }
        }

        match self.cache.delete(&expanded).await {
            Ok(deleted) => debug!(requested = expanded.len(), deleted, "cache entries invalidated"),
            Err(e) => {
                warn!(error = %e, keys = expanded.len(), "cache invalidation failed");
                self.metrics.increment_invalidation_failures();
            }
        }
    }

    /// Invalidate the list views of every login in `logins`.
    pub(crate) async fn invalidate_users<'a>(&self, logins: impl IntoIterator<Item = &'a Login>) {
        let keys: Vec<CacheKey> = logins.into_iter().map(CacheKey::user_docs).collect();
        if !keys.is_empty() {
            self.invalidate(&keys).await;
        }
    }

    /// Read a login's list index. Bypasses [`lookup`](Self::lookup) so the
    /// hit and miss counters only reflect document and list reads.
    async fn read_index(&self, index_key: &CacheKey) -> Vec<CacheKey> {
        let raw = match self.cache.get(index_key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, key = %index_key, "list index read failed");
                self.metrics.increment_cache_errors();
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, key = %index_key, "unreadable list index, discarding");
            Vec::new()
        })
    }
}
