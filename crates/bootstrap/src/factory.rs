use std::sync::Arc;

use tracing::info;

use docvault_blob::BlobStore;
use docvault_blob_filesystem::{FilesystemBlobConfig, FilesystemBlobStore};
use docvault_blob_memory::MemoryBlobStore;
use docvault_cache::Cache;
use docvault_cache_memory::MemoryCache;
#[cfg(feature = "redis")]
use docvault_cache_redis::{RedisCache, RedisCacheConfig};
use docvault_metadata_memory::MemoryMetadataStore;
use docvault_service::{DocumentService, DocumentServiceBuilder};

use crate::config::{BlobConfig, CacheConfig, DocVaultConfig, MetadataConfig};
use crate::error::BootstrapError;

/// Construct the cache backend named by `config.backend`.
pub fn create_cache(config: &CacheConfig) -> Result<Arc<dyn Cache>, BootstrapError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryCache::new())),
        #[cfg(feature = "redis")]
        "redis" => create_redis(config),
        other => Err(BootstrapError::Config(format!(
            "unsupported cache backend: {other} (is the feature enabled?)"
        ))),
    }
}

#[cfg(feature = "redis")]
fn create_redis(config: &CacheConfig) -> Result<Arc<dyn Cache>, BootstrapError> {
    let defaults = RedisCacheConfig::default();
    let redis_config = RedisCacheConfig {
        url: config.url.clone().unwrap_or(defaults.url),
        prefix: config.prefix.clone(),
        pool_size: config.pool_size.unwrap_or(defaults.pool_size),
        connection_timeout: defaults.connection_timeout,
    };
    let cache = RedisCache::new(&redis_config)
        .map_err(|e| BootstrapError::Config(format!("redis cache: {e}")))?;
    Ok(Arc::new(cache))
}

/// Construct the blob store named by `config.backend`.
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>, BootstrapError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryBlobStore::new())),
        "filesystem" => {
            let root = config.root.clone().ok_or_else(|| {
                BootstrapError::Config("filesystem backend requires 'root' in [blob]".into())
            })?;
            let store = FilesystemBlobStore::new(&FilesystemBlobConfig { root })
                .await
                .map_err(|e| BootstrapError::Config(format!("filesystem blob store: {e}")))?;
            Ok(Arc::new(store))
        }
        other => Err(BootstrapError::Config(format!(
            "unsupported blob backend: {other}"
        ))),
    }
}

/// Construct the metadata store named by `config.backend` and seed its
/// user directory.
pub fn create_metadata_store(
    config: &MetadataConfig,
) -> Result<Arc<MemoryMetadataStore>, BootstrapError> {
    match config.backend.as_str() {
        "memory" => {
            let store = MemoryMetadataStore::new();
            for user in &config.users {
                store.register_user(user.id.as_str(), user.login.as_str());
            }
            Ok(Arc::new(store))
        }
        other => Err(BootstrapError::Config(format!(
            "unsupported metadata backend: {other}"
        ))),
    }
}

/// Build a [`DocumentService`] with every backend taken from `config`.
pub async fn build_service(config: &DocVaultConfig) -> Result<DocumentService, BootstrapError> {
    let cache = create_cache(&config.cache)?;
    let blobs = create_blob_store(&config.blob).await?;
    let metadata = create_metadata_store(&config.metadata)?;

    let service = DocumentServiceBuilder::new()
        .metadata(metadata)
        .blobs(blobs)
        .cache(cache)
        .cache_ttl(config.service.cache_ttl())
        .build()?;

    info!(
        cache = %config.cache.backend,
        blob = %config.blob.backend,
        metadata = %config.metadata.backend,
        users = config.metadata.users.len(),
        "document service ready"
    );
    Ok(service)
}
