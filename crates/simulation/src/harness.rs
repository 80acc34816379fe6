//! Single-process harness wiring a [`DocumentService`] to in-memory stores
//! behind failure-injecting wrappers.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use docvault_blob::BlobStore;
use docvault_blob_memory::MemoryBlobStore;
use docvault_cache::{Cache, CacheKey};
use docvault_cache_memory::MemoryCache;
use docvault_core::{Document, DocumentId, Requester};
use docvault_metadata::MetadataStore;
use docvault_metadata_memory::MemoryMetadataStore;
use docvault_service::{DEFAULT_CACHE_TTL, DocumentService, DocumentServiceBuilder};

use crate::error::SimulationError;
use crate::failing::{
    FailingBlobStore, FailingCache, FailingMetadataStore, FailureSwitch, FailureType, StoreOp,
};

/// Users registered by [`SimulationHarness::start`].
pub const DEFAULT_USERS: [(&str, &str); 3] = [
    ("u-alice", "alice"),
    ("u-bob", "bob"),
    ("u-carol", "carol"),
];

/// Builder for a [`SimulationHarness`].
#[derive(Debug)]
pub struct SimulationHarnessBuilder {
    users: Vec<Requester>,
    cache_ttl: Duration,
}

impl SimulationHarnessBuilder {
    /// Register a user in the metadata store's directory.
    #[must_use]
    pub fn user(mut self, id: &str, login: &str) -> Self {
        self.users.push(Requester::new(id, login));
        self
    }

    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<SimulationHarness, SimulationError> {
        let metadata = Arc::new(MemoryMetadataStore::new());
        for user in &self.users {
            metadata.register_user(user.id.clone(), user.login.clone());
        }
        let blobs = Arc::new(MemoryBlobStore::new());
        let cache = Arc::new(MemoryCache::new());
        let switch = Arc::new(FailureSwitch::new());

        let service = DocumentServiceBuilder::new()
            .metadata(Arc::new(FailingMetadataStore::new(
                metadata.clone(),
                Arc::clone(&switch),
            )))
            .blobs(Arc::new(FailingBlobStore::new(
                blobs.clone(),
                Arc::clone(&switch),
            )))
            .cache(Arc::new(FailingCache::new(cache.clone(), Arc::clone(&switch))))
            .cache_ttl(self.cache_ttl)
            .build()?;

        debug!(users = self.users.len(), "simulation harness started");
        Ok(SimulationHarness {
            service,
            metadata,
            blobs,
            cache,
            switch,
            users: self.users,
        })
    }
}

/// A document service over in-memory stores, with direct access to the
/// stores for inspection and a [`FailureSwitch`] for fault injection.
pub struct SimulationHarness {
    service: DocumentService,
    metadata: Arc<MemoryMetadataStore>,
    blobs: Arc<MemoryBlobStore>,
    cache: Arc<MemoryCache>,
    switch: Arc<FailureSwitch>,
    users: Vec<Requester>,
}

impl std::fmt::Debug for SimulationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHarness")
            .field("service", &self.service)
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl SimulationHarness {
    pub fn builder() -> SimulationHarnessBuilder {
        SimulationHarnessBuilder {
            users: Vec::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Start a harness with [`DEFAULT_USERS`] registered.
    pub fn start() -> Result<Self, SimulationError> {
        DEFAULT_USERS
            .iter()
            .fold(Self::builder(), |b, (id, login)| b.user(id, login))
            .build()
    }

    pub fn service(&self) -> &DocumentService {
        &self.service
    }

    /// The registered requester with `login`.
    pub fn requester(&self, login: &str) -> Result<Requester, SimulationError> {
        self.users
            .iter()
            .find(|u| u.login.as_str() == login)
            .cloned()
            .ok_or_else(|| SimulationError::UnknownUser(login.to_owned()))
    }

    // -- Fault injection --

    pub fn fail(&self, op: StoreOp, failure: FailureType) {
        self.switch.fail(op, failure);
    }

    pub fn fail_times(&self, op: StoreOp, failure: FailureType, n: usize) {
        self.switch.fail_times(op, failure, n);
    }

    /// Make every cache operation fail with a connection error.
    pub fn take_cache_down(&self) {
        for op in [StoreOp::CacheGet, StoreOp::CacheSet, StoreOp::CacheDelete] {
            self.switch
                .fail(op, FailureType::Connection("cache unreachable".into()));
        }
    }

    pub fn heal(&self, op: StoreOp) {
        self.switch.heal(op);
    }

    pub fn heal_all(&self) {
        self.switch.heal_all();
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        self.switch.call_count(op)
    }

    pub fn reset_counts(&self) {
        self.switch.reset_counts();
    }

    pub fn last_subject(&self, op: StoreOp) -> Option<String> {
        self.switch.last_subject(op)
    }

    // -- Direct store inspection (bypasses fault injection) --

    /// The stored metadata record, if any.
    pub async fn stored_document(&self, id: &DocumentId) -> Option<Document> {
        self.metadata.by_id(id).await.ok()
    }

    /// Remove a metadata record behind the service's back.
    pub async fn remove_metadata(&self, id: &DocumentId) -> bool {
        self.metadata.delete(id).await.is_ok()
    }

    /// The stored blob content for `doc`, if any.
    pub async fn stored_blob(&self, doc: &Document) -> Option<Bytes> {
        self.blobs.load(doc).await.ok()
    }

    /// Returns `true` if content is stored under `key`.
    pub fn has_blob(&self, key: &str) -> bool {
        self.blobs.contains(key)
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn document_count(&self) -> usize {
        self.metadata.len()
    }

    /// Returns `true` if the cache holds a live entry for `key`.
    pub fn is_cached(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Write a raw cache entry behind the service's back.
    pub async fn seed_cache(&self, key: &CacheKey, value: &str) {
        if let Err(e) = self.cache.set(key, value, None).await {
            debug!(error = %e, key = %key, "seeding cache failed");
        }
    }

    /// Raw cached value for `key`.
    pub async fn cached_value(&self, key: &CacheKey) -> Option<String> {
        self.cache.get(key).await.ok().flatten()
    }
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; silent otherwise.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
