use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for [`FilesystemBlobStore`](crate::FilesystemBlobStore).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesystemBlobConfig {
    /// Directory under which blobs are written. Created on startup.
    pub root: PathBuf,
}

impl Default for FilesystemBlobConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/blobs"),
        }
    }
}
