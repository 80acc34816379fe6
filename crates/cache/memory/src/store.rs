use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use docvault_cache::error::CacheError;
use docvault_cache::key::CacheKey;
use docvault_cache::store::Cache;

/// A single entry in the in-memory cache.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    /// Returns `true` if this entry has passed its TTL deadline.
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory [`Cache`] backed by a [`DashMap`].
///
/// Entries are lazily evicted on read when their TTL has elapsed.
#[derive(Debug, Default)]
pub struct MemoryCache {
    data: DashMap<String, Entry>,
}

impl MemoryCache {
    /// Create a new, empty in-memory cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.data.iter().filter(|e| !e.value().is_expired()).count()
    }

    /// Returns `true` if no live entry remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.data
            .get(&key.canonical())
            .is_some_and(|e| !e.is_expired())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let rendered = key.canonical();

        if let Some(entry) = self.data.get(&rendered) {
            if entry.is_expired() {
                drop(entry);
                self.data.remove_if(&rendered, |_, e| e.is_expired());
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }

        Ok(None)
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.data.insert(
            key.canonical(),
            Entry {
                value: value.to_owned(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<u64, CacheError> {
        let mut removed = 0;
        for key in keys {
            // Expired entries are removed too but do not count as existing.
            if let Some((_, entry)) = self.data.remove(&key.canonical()) {
                if !entry.is_expired() {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docvault_cache::testing::run_cache_conformance_tests;
    use docvault_core::{DocumentId, Login};

    use super::*;

    fn doc_key(id: &str) -> CacheKey {
        CacheKey::document(&DocumentId::new(id))
    }

    #[tokio::test]
    async fn conformance() {
        let cache = MemoryCache::new();
        run_cache_conformance_tests(&cache)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_via_get() {
        let cache = MemoryCache::new();
        let key = doc_key("ttl-expire");

        cache
            .set(&key, "short-lived", Some(Duration::from_secs(5)))
            .await
            .unwrap();

        let val = cache.get(&key).await.unwrap();
        assert_eq!(val.as_deref(), Some("short-lived"));

        tokio::time::advance(Duration::from_secs(6)).await;

        let val = cache.get(&key).await.unwrap();
        assert!(val.is_none(), "value should be expired");
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_refreshes_ttl() {
        let cache = MemoryCache::new();
        let key = CacheKey::user_docs(&Login::new("alice"));

        cache.set(&key, "v1", Some(Duration::from_secs(5))).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        cache.set(&key, "v2", Some(Duration::from_secs(5))).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_does_not_count_expired_entries() {
        let cache = MemoryCache::new();
        let key = doc_key("expired-delete");

        cache.set(&key, "v", Some(Duration::from_secs(1))).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.delete(&[key.clone()]).await.unwrap(), 0);
        assert!(!cache.contains(&key));
    }

    #[tokio::test]
    async fn no_ttl_means_no_expiry() {
        let cache = MemoryCache::new();
        let key = doc_key("forever");
        cache.set(&key, "v", None).await.unwrap();
        assert!(cache.contains(&key));
        assert_eq!(cache.len(), 1);
    }
}
