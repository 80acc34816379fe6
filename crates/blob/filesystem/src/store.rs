use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

use docvault_blob::error::BlobError;
use docvault_blob::store::BlobStore;
use docvault_core::Document;

use crate::config::FilesystemBlobConfig;

/// Blob store writing one file per document under a root directory.
#[derive(Debug)]
pub struct FilesystemBlobStore {
    root: PathBuf,
    canonical_root: PathBuf,
}

impl FilesystemBlobStore {
    /// Create the store, creating the root directory if needed.
    pub async fn new(config: &FilesystemBlobConfig) -> Result<Self, BlobError> {
        fs::create_dir_all(&config.root).await?;
        let canonical_root = fs::canonicalize(&config.root).await?;
        Ok(Self {
            root: config.root.clone(),
            canonical_root,
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a blob key to a path under the root, rejecting keys that could
    /// escape it.
    async fn key_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() {
            return Err(BlobError::InvalidKey("empty key".to_owned()));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(BlobError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }
        if !Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(BlobError::InvalidKey(format!(
                "contains unsafe path component: {key}"
            )));
        }
        let path = self.root.join(key);
        self.ensure_within_root(&path, key).await?;
        Ok(path)
    }

    /// Resolve the nearest existing ancestor of `path` (itself included)
    /// through symlinks and require it to stay under the root.
    async fn ensure_within_root(&self, path: &Path, key: &str) -> Result<(), BlobError> {
        let mut ancestor = path;
        loop {
            match fs::symlink_metadata(ancestor).await {
                Ok(meta) => {
                    let resolved = fs::canonicalize(ancestor).await.map_err(|e| {
                        if meta.file_type().is_symlink() {
                            BlobError::InvalidKey(format!("dangling symlink: {key}"))
                        } else {
                            BlobError::Io(e)
                        }
                    })?;
                    if !resolved.starts_with(&self.canonical_root) {
                        return Err(BlobError::InvalidKey(format!(
                            "resolves outside the store root: {key}"
                        )));
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(BlobError::Io(e)),
            }
            match ancestor.parent() {
                Some(parent) => ancestor = parent,
                None => return Ok(()),
            }
        }
    }
}

fn not_found_or_io(key: &str) -> impl FnOnce(std::io::Error) -> BlobError + '_ {
    move |e| {
        if e.kind() == ErrorKind::NotFound {
            BlobError::NotFound(key.to_owned())
        } else {
            BlobError::Io(e)
        }
    }
}

async fn write_then_rename(temp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, path).await
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    #[instrument(skip(self, doc, content), fields(backend = "filesystem", key = doc.blob_key(), size = content.len()))]
    async fn save(&self, doc: &Document, content: Bytes) -> Result<(), BlobError> {
        let path = self.key_path(doc.blob_key()).await?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Unique temp name so concurrent writers to one key never interleave.
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!("{file_name}.tmp.{}", Uuid::new_v4()));
        if let Err(e) = write_then_rename(&temp_path, &path, &content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(BlobError::Io(e));
        }

        debug!(path = %path.display(), "blob written");
        Ok(())
    }

    #[instrument(skip(self, doc), fields(backend = "filesystem", key = doc.blob_key()))]
    async fn load(&self, doc: &Document) -> Result<Bytes, BlobError> {
        let key = doc.blob_key();
        let path = self.key_path(key).await?;
        let data = fs::read(&path).await.map_err(not_found_or_io(key))?;
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self, doc), fields(backend = "filesystem", key = doc.blob_key()))]
    async fn delete(&self, doc: &Document) -> Result<(), BlobError> {
        let key = doc.blob_key();
        let path = self.key_path(key).await?;
        fs::remove_file(&path).await.map_err(not_found_or_io(key))
    }
}
