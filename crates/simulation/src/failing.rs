//! Store wrappers that fail selected operations on demand.
//!
//! Each wrapper delegates to an inner store unless the shared
//! [`FailureSwitch`] has a failure armed for the operation being called.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use docvault_blob::{BlobError, BlobStore};
use docvault_cache::{Cache, CacheError, CacheKey};
use docvault_core::{Document, DocumentFilter, DocumentId, Login, UserId};
use docvault_metadata::{MetadataError, MetadataStore};

/// One operation of one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CacheGet,
    CacheSet,
    CacheDelete,
    MetadataCreate,
    MetadataById,
    MetadataByOwner,
    MetadataDelete,
    MetadataReplaceGrants,
    MetadataGrantedTo,
    MetadataFiltered,
    BlobSave,
    BlobLoad,
    BlobDelete,
}

/// Type of failure to simulate.
#[derive(Debug, Clone)]
pub enum FailureType {
    /// The backend cannot be reached.
    Connection(String),
    /// The backend answered with an error.
    Backend(String),
    /// The addressed entity is reported absent.
    NotFound,
    /// The call hangs for the given duration, then fails.
    Timeout(Duration),
}

#[derive(Debug, Clone)]
struct Armed {
    failure: FailureType,
    /// Remaining failures; `None` fails forever.
    remaining: Option<usize>,
}

/// Shared failure plan and call counter for the wrappers of one harness.
#[derive(Debug, Default)]
pub struct FailureSwitch {
    armed: Mutex<HashMap<StoreOp, Armed>>,
    calls: Mutex<HashMap<StoreOp, Vec<String>>>,
}

impl FailureSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `op` until [`heal`](Self::heal) is called.
    pub fn fail(&self, op: StoreOp, failure: FailureType) {
        self.armed.lock().insert(
            op,
            Armed {
                failure,
                remaining: None,
            },
        );
    }

    /// Fail the next `n` calls of `op`, then succeed again.
    pub fn fail_times(&self, op: StoreOp, failure: FailureType, n: usize) {
        if n == 0 {
            self.heal(op);
            return;
        }
        self.armed.lock().insert(
            op,
            Armed {
                failure,
                remaining: Some(n),
            },
        );
    }

    /// Stop failing `op`.
    pub fn heal(&self, op: StoreOp) {
        self.armed.lock().remove(&op);
    }

    /// Stop failing every operation.
    pub fn heal_all(&self) {
        self.armed.lock().clear();
    }

    /// Number of calls of `op` seen so far, failed or not.
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.calls.lock().get(&op).map_or(0, Vec::len)
    }

    /// Subject of the latest call of `op`: a document ID, blob key, login,
    /// user ID, or comma-joined cache keys.
    pub fn last_subject(&self, op: StoreOp) -> Option<String> {
        self.calls.lock().get(&op).and_then(|s| s.last().cloned())
    }

    /// Reset every call counter.
    pub fn reset_counts(&self) {
        self.calls.lock().clear();
    }

    /// Record a call of `op` and return the failure to inject, if any.
    async fn check(&self, op: StoreOp, subject: &str) -> Option<FailureType> {
        self.calls
            .lock()
            .entry(op)
            .or_default()
            .push(subject.to_owned());

        let failure = {
            let mut armed = self.armed.lock();
            let entry = armed.get_mut(&op)?;
            let failure = entry.failure.clone();
            let exhausted = match &mut entry.remaining {
                Some(n) => {
                    *n = n.saturating_sub(1);
                    *n == 0
                }
                None => false,
            };
            if exhausted {
                armed.remove(&op);
            }
            failure
        };

        if let FailureType::Timeout(d) = &failure {
            tokio::time::sleep(*d).await;
        }
        Some(failure)
    }
}

impl FailureType {
    fn into_cache_error(self) -> CacheError {
        match self {
            Self::Connection(msg) => CacheError::Connection(msg),
            Self::Backend(msg) => CacheError::Backend(msg),
            Self::NotFound => CacheError::Backend("simulated not found".into()),
            Self::Timeout(d) => CacheError::Timeout(d),
        }
    }

    fn into_metadata_error(self, subject: &str) -> MetadataError {
        match self {
            Self::Connection(msg) => MetadataError::Connection(msg),
            Self::Backend(msg) => MetadataError::Backend(msg),
            Self::NotFound => MetadataError::NotFound(subject.to_owned()),
            Self::Timeout(d) => MetadataError::Connection(format!("timed out after {d:?}")),
        }
    }

    fn into_blob_error(self, key: &str) -> BlobError {
        match self {
            Self::Connection(msg) | Self::Backend(msg) => BlobError::Storage(msg),
            Self::NotFound => BlobError::NotFound(key.to_owned()),
            Self::Timeout(d) => BlobError::Storage(format!("timed out after {d:?}")),
        }
    }
}

/// [`Cache`] wrapper with injectable failures.
pub struct FailingCache {
    inner: Arc<dyn Cache>,
    switch: Arc<FailureSwitch>,
}

impl FailingCache {
    pub fn new(inner: Arc<dyn Cache>, switch: Arc<FailureSwitch>) -> Self {
        Self { inner, switch }
    }
}

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        if let Some(f) = self.switch.check(StoreOp::CacheGet, &key.canonical()).await {
            return Err(f.into_cache_error());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if let Some(f) = self.switch.check(StoreOp::CacheSet, &key.canonical()).await {
            return Err(f.into_cache_error());
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<u64, CacheError> {
        let subject = keys.iter().map(CacheKey::canonical).collect::<Vec<_>>().join(",");
        if let Some(f) = self.switch.check(StoreOp::CacheDelete, &subject).await {
            return Err(f.into_cache_error());
        }
        self.inner.delete(keys).await
    }
}

/// [`MetadataStore`] wrapper with injectable failures.
pub struct FailingMetadataStore {
    inner: Arc<dyn MetadataStore>,
    switch: Arc<FailureSwitch>,
}

impl FailingMetadataStore {
    pub fn new(inner: Arc<dyn MetadataStore>, switch: Arc<FailureSwitch>) -> Self {
        Self { inner, switch }
    }
}

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn create(&self, doc: &Document) -> Result<(), MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataCreate, &doc.id).await {
            return Err(f.into_metadata_error(&doc.id));
        }
        self.inner.create(doc).await
    }

    async fn by_id(&self, id: &DocumentId) -> Result<Document, MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataById, id).await {
            return Err(f.into_metadata_error(id));
        }
        self.inner.by_id(id).await
    }

    async fn by_owner(&self, owner: &UserId) -> Result<Vec<Document>, MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataByOwner, owner).await {
            return Err(f.into_metadata_error(owner));
        }
        self.inner.by_owner(owner).await
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataDelete, id).await {
            return Err(f.into_metadata_error(id));
        }
        self.inner.delete(id).await
    }

    async fn replace_grants(&self, id: &DocumentId, logins: &[Login]) -> Result<(), MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataReplaceGrants, id).await {
            return Err(f.into_metadata_error(id));
        }
        self.inner.replace_grants(id, logins).await
    }

    async fn documents_granted_to(&self, login: &Login) -> Result<Vec<Document>, MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataGrantedTo, login).await {
            return Err(f.into_metadata_error(login));
        }
        self.inner.documents_granted_to(login).await
    }

    async fn filtered(
        &self,
        owner_login: Option<&Login>,
        requester: &UserId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, MetadataError> {
        if let Some(f) = self.switch.check(StoreOp::MetadataFiltered, requester).await {
            return Err(f.into_metadata_error(requester));
        }
        self.inner.filtered(owner_login, requester, filter).await
    }
}

/// [`BlobStore`] wrapper with injectable failures.
pub struct FailingBlobStore {
    inner: Arc<dyn BlobStore>,
    switch: Arc<FailureSwitch>,
}

impl FailingBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>, switch: Arc<FailureSwitch>) -> Self {
        Self { inner, switch }
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn save(&self, doc: &Document, content: Bytes) -> Result<(), BlobError> {
        if let Some(f) = self.switch.check(StoreOp::BlobSave, doc.blob_key()).await {
            return Err(f.into_blob_error(doc.blob_key()));
        }
        self.inner.save(doc, content).await
    }

    async fn load(&self, doc: &Document) -> Result<Bytes, BlobError> {
        if let Some(f) = self.switch.check(StoreOp::BlobLoad, doc.blob_key()).await {
            return Err(f.into_blob_error(doc.blob_key()));
        }
        self.inner.load(doc).await
    }

    async fn delete(&self, doc: &Document) -> Result<(), BlobError> {
        if let Some(f) = self.switch.check(StoreOp::BlobDelete, doc.blob_key()).await {
            return Err(f.into_blob_error(doc.blob_key()));
        }
        self.inner.delete(doc).await
    }
}
