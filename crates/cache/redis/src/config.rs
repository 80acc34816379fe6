use std::time::Duration;

use serde::Deserialize;

/// Configuration for the Redis cache backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g. `redis://127.0.0.1:6379/0`).
    pub url: String,

    /// Optional namespace prepended to every key. Leave unset to keep the
    /// bare key layout shared with other services reading the same cache.
    pub prefix: Option<String>,

    /// Number of connections in the `deadpool-redis` pool.
    pub pool_size: usize,

    /// Timeout for acquiring a pooled connection.
    #[serde(with = "duration_secs")]
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://127.0.0.1:6379"),
            prefix: None,
            pool_size: 10,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
