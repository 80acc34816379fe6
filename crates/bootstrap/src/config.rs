use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::BootstrapError;

/// Top-level DocVault configuration, loaded from a TOML file.
///
/// Every section is optional; an empty file yields an all-in-memory setup.
#[derive(Debug, Default, Deserialize)]
pub struct DocVaultConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocVaultConfig {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BootstrapError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, BootstrapError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Behaviour of the document service itself.
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    /// TTL in seconds for every cache write.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

impl ServiceConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

fn default_cache_ttl_seconds() -> u64 {
    docvault_service::DEFAULT_CACHE_TTL.as_secs()
}

/// Configuration for the read-through cache backend.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Which backend to use: `"memory"` or `"redis"`.
    #[serde(default = "default_memory")]
    pub backend: String,

    /// Connection URL for the redis backend.
    pub url: Option<String>,

    /// Optional key namespace for the redis backend.
    pub prefix: Option<String>,

    /// Connection pool size for the redis backend.
    pub pool_size: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_memory(),
            url: None,
            prefix: None,
            pool_size: None,
        }
    }
}

/// Configuration for the blob store backend.
#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// Which backend to use: `"memory"` or `"filesystem"`.
    #[serde(default = "default_memory")]
    pub backend: String,

    /// Root directory for the filesystem backend.
    pub root: Option<PathBuf>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_memory(),
            root: None,
        }
    }
}

/// Configuration for the metadata store backend.
#[derive(Debug, Deserialize)]
pub struct MetadataConfig {
    /// Which backend to use. Only `"memory"` is built in.
    #[serde(default = "default_memory")]
    pub backend: String,

    /// Users registered in the in-memory user directory at startup.
    ///
    /// ```toml
    /// [[metadata.users]]
    /// id = "u-alice"
    /// login = "alice"
    /// ```
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            backend: default_memory(),
            users: Vec::new(),
        }
    }
}

/// One `(id, login)` pair of the user directory.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub login: String,
}

/// Log output settings.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"pretty"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_memory() -> String {
    "memory".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_defaults_to_memory() {
        let config = DocVaultConfig::from_toml("").unwrap();
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.blob.backend, "memory");
        assert_eq!(config.metadata.backend, "memory");
        assert!(config.metadata.users.is_empty());
        assert_eq!(config.service.cache_ttl(), docvault_service::DEFAULT_CACHE_TTL);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
            [service]
            cache_ttl_seconds = 60

            [cache]
            backend = "redis"
            url = "redis://cache:6379/1"
            prefix = "dv"
            pool_size = 4

            [blob]
            backend = "filesystem"
            root = "/var/lib/docvault"

            [[metadata.users]]
            id = "u-alice"
            login = "alice"

            [[metadata.users]]
            id = "u-bob"
            login = "bob"

            [logging]
            level = "docvault=debug"
            format = "json"
        "#;
        let config = DocVaultConfig::from_toml(toml).unwrap();
        assert_eq!(config.service.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.backend, "redis");
        assert_eq!(config.cache.url.as_deref(), Some("redis://cache:6379/1"));
        assert_eq!(config.cache.prefix.as_deref(), Some("dv"));
        assert_eq!(config.cache.pool_size, Some(4));
        assert_eq!(config.blob.root, Some(PathBuf::from("/var/lib/docvault")));
        assert_eq!(config.metadata.users.len(), 2);
        assert_eq!(config.metadata.users[1].login, "bob");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DocVaultConfig::from_toml("[cache\nbackend=").unwrap_err();
        assert!(matches!(err, BootstrapError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docvault.toml");
        std::fs::write(&path, "[service]\ncache_ttl_seconds = 5\n").unwrap();

        let config = DocVaultConfig::load(&path).unwrap();
        assert_eq!(config.service.cache_ttl_seconds, 5);

        let err = DocVaultConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, BootstrapError::Io(_)));
    }
}
