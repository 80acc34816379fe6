use async_trait::async_trait;
use bytes::Bytes;

use docvault_core::Document;

use crate::error::BlobError;

/// Content storage for file-backed documents.
///
/// Backends address content by [`Document::blob_key`]; the rest of the
/// document is opaque to them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the content of `doc`, replacing any previous content.
    async fn save(&self, doc: &Document, content: Bytes) -> Result<(), BlobError>;

    /// Load the content of `doc`.
    ///
    /// Returns [`BlobError::NotFound`] if no content is stored.
    async fn load(&self, doc: &Document) -> Result<Bytes, BlobError>;

    /// Delete the content of `doc`.
    ///
    /// Returns [`BlobError::NotFound`] if no content was stored.
    async fn delete(&self, doc: &Document) -> Result<(), BlobError>;
}
