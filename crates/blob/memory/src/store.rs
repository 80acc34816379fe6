use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use docvault_blob::error::BlobError;
use docvault_blob::store::BlobStore;
use docvault_core::Document;

/// In-memory blob store keyed by [`Document::blob_key`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Returns `true` if content is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, doc: &Document, content: Bytes) -> Result<(), BlobError> {
        self.blobs.insert(doc.blob_key().to_owned(), content);
        Ok(())
    }

    async fn load(&self, doc: &Document) -> Result<Bytes, BlobError> {
        let key = doc.blob_key();
        self.blobs
            .get(key)
            .map(|b| b.value().clone())
            .ok_or_else(|| BlobError::NotFound(key.to_owned()))
    }

    async fn delete(&self, doc: &Document) -> Result<(), BlobError> {
        let key = doc.blob_key();
        self.blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_owned()))
    }
}
