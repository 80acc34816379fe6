use std::sync::Arc;
use std::time::Duration;

use docvault_blob::BlobStore;
use docvault_cache::Cache;
use docvault_metadata::MetadataStore;

use crate::cache_layer::CacheLayer;
use crate::error::ServiceError;
use crate::metrics::ServiceMetrics;
use crate::service::{DEFAULT_CACHE_TTL, DocumentService};

/// Fluent builder for constructing a [`DocumentService`].
///
/// A metadata store, a blob store and a cache must be supplied. The cache
/// TTL defaults to [`DEFAULT_CACHE_TTL`].
pub struct DocumentServiceBuilder {
    metadata: Option<Arc<dyn MetadataStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    cache: Option<Arc<dyn Cache>>,
    cache_ttl: Duration,
    metrics: Option<Arc<ServiceMetrics>>,
}

impl DocumentServiceBuilder {
    pub fn new() -> Self {
        Self {
            metadata: None,
            blobs: None,
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            metrics: None,
        }
    }

    #[must_use]
    pub fn metadata(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata = Some(store);
        self
    }

    #[must_use]
    pub fn blobs(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(store);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the TTL applied to every cache write.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Share an existing metrics instance instead of creating a new one.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Consume the builder and produce a [`DocumentService`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Configuration`] if a required store is
    /// missing or the TTL is zero.
    pub fn build(self) -> Result<DocumentService, ServiceError> {
        let metadata = self
            .metadata
            .ok_or_else(|| ServiceError::Configuration("metadata store is required".into()))?;
        let blobs = self
            .blobs
            .ok_or_else(|| ServiceError::Configuration("blob store is required".into()))?;
        let cache = self
            .cache
            .ok_or_else(|| ServiceError::Configuration("cache is required".into()))?;
        if self.cache_ttl.is_zero() {
            return Err(ServiceError::Configuration(
                "cache TTL must be positive".into(),
            ));
        }

        let metrics = self.metrics.unwrap_or_default();
        Ok(DocumentService {
            metadata,
            blobs,
            cache: CacheLayer::new(cache, self.cache_ttl, Arc::clone(&metrics)),
            metrics,
        })
    }
}

impl Default for DocumentServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
