use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use docvault_cache::error::CacheError;
use docvault_cache::key::CacheKey;
use docvault_cache::store::Cache;

use crate::config::RedisCacheConfig;
use crate::key_render::render_key;

/// Redis-backed implementation of [`Cache`].
///
/// Values are stored as plain Redis strings; TTLs use `SET ... PX`.
pub struct RedisCache {
    pool: Pool,
    prefix: Option<String>,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Create a new `RedisCache` from the provided configuration.
    ///
    /// The pool connects lazily; an unreachable server surfaces as
    /// [`CacheError::Connection`] on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisCacheConfig) -> Result<Self, CacheError> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| CacheError::Connection(e.to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    fn render(&self, key: &CacheKey) -> String {
        render_key(self.prefix.as_deref(), key)
    }

    /// Obtain a connection from the pool.
    async fn conn(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let redis_key = self.render(key);
        let mut conn = self.conn().await?;

        let val: Option<String> = conn
            .get(&redis_key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(val)
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let redis_key = self.render(key);
        let mut conn = self.conn().await?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(&redis_key).arg(value);
        if let Some(ttl) = ttl {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            cmd.arg("PX").arg(ttl_ms);
        }

        let _: () = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let redis_keys: Vec<String> = keys.iter().map(|k| self.render(k)).collect();
        let mut conn = self.conn().await?;

        let deleted: u64 = conn
            .del(&redis_keys)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        debug!(requested = redis_keys.len(), deleted, "redis keys deleted");
        Ok(deleted)
    }
}
