use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use docvault_blob::{BlobError, BlobStore};
use docvault_cache::CacheKey;
use docvault_core::{
    Document, DocumentDraft, DocumentFilter, DocumentId, Login, Requester, access,
};
use docvault_metadata::{MetadataError, MetadataStore};

use crate::cache_layer::CacheLayer;
use crate::error::ServiceError;
use crate::metrics::ServiceMetrics;

/// TTL applied to every cache write unless the builder overrides it.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// A readable document together with its blob content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub document: Document,
    /// Blob content; `None` for inline JSON documents.
    pub content: Option<Bytes>,
}

/// The access-control and caching core.
///
/// Orchestrates reads and writes across the metadata store, the blob store
/// and the read-through cache. Holds no state of its own between calls.
/// Construct with [`DocumentServiceBuilder`](crate::DocumentServiceBuilder).
pub struct DocumentService {
    pub(crate) metadata: Arc<dyn MetadataStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) cache: CacheLayer,
    pub(crate) metrics: Arc<ServiceMetrics>,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("cache_ttl", &self.cache.ttl())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

fn internal(context: &str, e: &impl std::fmt::Display) -> ServiceError {
    ServiceError::Internal(format!("{context}: {e}"))
}

impl DocumentService {
    /// Returns the service's counters.
    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Fetch one document's metadata, preferring the cache.
    ///
    /// A cache failure behaves like a miss. A cache hit that does not
    /// deserialize is `Internal` rather than a silent fallback.
    #[instrument(skip(self), fields(doc_id = %id))]
    pub async fn resolve_document(&self, id: &DocumentId) -> Result<Document, ServiceError> {
        let key = CacheKey::document(id);
        if let Some(raw) = self.cache.lookup(&key).await {
            return serde_json::from_str(&raw).map_err(|e| internal("corrupt cached document", &e));
        }

        let doc = self.metadata.by_id(id).await.map_err(|e| match e {
            MetadataError::NotFound(_) => ServiceError::NotFound(id.to_string()),
            other => internal("metadata lookup failed", &other),
        })?;

        match serde_json::to_string(&doc) {
            Ok(raw) => self.cache.store(&key, &raw).await,
            Err(e) => warn!(error = %e, "document serialization failed, not caching"),
        }
        Ok(doc)
    }

    /// Fetch a readable document and, for files, its content.
    #[instrument(skip(self, requester), fields(doc_id = %id, user_id = %requester.id))]
    pub async fn get_document(
        &self,
        id: &DocumentId,
        requester: &Requester,
    ) -> Result<FetchedDocument, ServiceError> {
        let document = self.resolve_document(id).await?;
        if !access::has_read_access(&document, requester) {
            return Err(self.forbidden("read", id));
        }

        let content = if document.is_file {
            let bytes = self
                .blobs
                .load(&document)
                .await
                .map_err(|e| internal("blob load failed", &e))?;
            Some(bytes)
        } else {
            None
        };

        Ok(FetchedDocument { document, content })
    }

    /// List the documents visible to `requester`, optionally restricted to
    /// one owner and one filter constraint.
    ///
    /// A cached result is returned without re-validating `filter`.
    #[instrument(skip(self, requester, filter), fields(user_id = %requester.id))]
    pub async fn list_documents(
        &self,
        requester: &Requester,
        owner_login: Option<&Login>,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, ServiceError> {
        let key = CacheKey::list(&requester.login, owner_login, filter);
        if let Some(raw) = self.cache.lookup(&key).await {
            return serde_json::from_str(&raw).map_err(|e| internal("corrupt cached list", &e));
        }

        filter.validate()?;

        let docs = match self.metadata.filtered(owner_login, &requester.id, filter).await {
            Ok(docs) => docs,
            Err(MetadataError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(internal("metadata query failed", &e)),
        };

        match serde_json::to_string(&docs) {
            Ok(raw) => self.cache.store_list(&requester.login, &key, &raw).await,
            Err(e) => warn!(error = %e, "list serialization failed, not caching"),
        }
        Ok(docs)
    }

    /// Number of documents [`list_documents`](Self::list_documents) would
    /// return for the same arguments.
    pub async fn count_documents(
        &self,
        requester: &Requester,
        owner_login: Option<&Login>,
        filter: &DocumentFilter,
    ) -> Result<usize, ServiceError> {
        self.list_documents(requester, owner_login, filter)
            .await
            .map(|docs| docs.len())
    }

    /// Create a document owned by `requester` and return its new ID.
    ///
    /// The blob is written before the metadata and the metadata before the
    /// grants; a failed step removes what the earlier steps wrote.
    #[instrument(skip(self, requester, draft, content), fields(user_id = %requester.id, name = %draft.name))]
    pub async fn upload(
        &self,
        requester: &Requester,
        draft: DocumentDraft,
        content: Bytes,
    ) -> Result<DocumentId, ServiceError> {
        let doc = Document::from_draft(draft, requester.id.clone());
        doc.validate_payload()?;

        if doc.is_file {
            self.blobs
                .save(&doc, content)
                .await
                .map_err(|e| internal("blob save failed", &e))?;
        }

        if let Err(e) = self.metadata.create(&doc).await {
            self.roll_back_upload(&doc, false).await;
            return Err(internal("metadata create failed", &e));
        }

        if !doc.grants.is_empty() {
            if let Err(e) = self.metadata.replace_grants(&doc.id, &doc.grants).await {
                self.roll_back_upload(&doc, true).await;
                return Err(internal("grant persistence failed", &e));
            }
            self.cache.invalidate_users(&doc.grants).await;
        }

        self.cache.invalidate_users([&requester.login]).await;

        self.metrics.increment_uploads();
        info!(doc_id = %doc.id, is_file = doc.is_file, "document uploaded");
        Ok(doc.id)
    }

    /// Delete a document owned by `requester`.
    ///
    /// Metadata already gone counts as deleted. A missing blob after the
    /// metadata is removed is reported as `NotFound`.
    #[instrument(skip(self, requester), fields(doc_id = %id, user_id = %requester.id))]
    pub async fn delete(&self, id: &DocumentId, requester: &Requester) -> Result<(), ServiceError> {
        let doc = self.resolve_document(id).await?;
        if !access::has_delete_access(&doc, requester) {
            return Err(self.forbidden("delete", id));
        }

        match self.metadata.delete(id).await {
            Ok(()) => {}
            Err(MetadataError::NotFound(_)) => {
                warn!("metadata already deleted, continuing");
            }
            Err(e) => return Err(internal("metadata delete failed", &e)),
        }

        self.cache
            .invalidate(&[CacheKey::document(id), CacheKey::user_docs(&requester.login)])
            .await;

        if doc.is_file {
            self.blobs.delete(&doc).await.map_err(|e| match e {
                BlobError::NotFound(key) => ServiceError::NotFound(format!("blob {key}")),
                other => internal("blob delete failed", &other),
            })?;
        }

        self.metrics.increment_deletes();
        info!("document deleted");
        Ok(())
    }

    /// Replace the grant list of a document owned by `requester`.
    ///
    /// Logins dropped from the list have their cached list views
    /// invalidated. Newly added logins do not; their views catch up when
    /// the entries expire.
    #[instrument(skip(self, requester, logins), fields(doc_id = %id, user_id = %requester.id, grants = logins.len()))]
    pub async fn grant(
        &self,
        id: &DocumentId,
        requester: &Requester,
        logins: &[Login],
    ) -> Result<(), ServiceError> {
        let doc = self.resolve_document(id).await?;
        if !access::has_grant_access(&doc, requester) {
            return Err(self.forbidden("grant", id));
        }

        self.metadata
            .replace_grants(id, logins)
            .await
            .map_err(|e| internal("grant replacement failed", &e))?;

        self.cache
            .invalidate(&[CacheKey::document(id), CacheKey::user_docs(&requester.login)])
            .await;
        self.cache.invalidate_users(&doc.grants).await;

        self.metrics.increment_grants();
        info!(previous = doc.grants.len(), "grants replaced");
        Ok(())
    }

    fn forbidden(&self, action: &str, id: &DocumentId) -> ServiceError {
        self.metrics.increment_forbidden();
        debug!(action, "access denied");
        ServiceError::Forbidden(format!("{action} on document {id}"))
    }

    /// Undo a partial upload in reverse creation order. Failures are logged
    /// only.
    async fn roll_back_upload(&self, doc: &Document, metadata_written: bool) {
        if metadata_written {
            self.metrics.increment_rollbacks();
            if let Err(e) = self.metadata.delete(&doc.id).await {
                warn!(error = %e, doc_id = %doc.id, "rollback of metadata failed");
            }
        }
        if doc.is_file {
            self.metrics.increment_rollbacks();
            if let Err(e) = self.blobs.delete(doc).await {
                warn!(error = %e, doc_id = %doc.id, "rollback of blob failed");
            }
        }
    }
}
