//! Local filesystem backend for DocVault blob storage.
//!
//! Each blob is one file under a configured root directory, named by the
//! document's blob key. Keys that would resolve outside the root, lexically
//! or through a symlink, are rejected.

mod config;
mod store;

pub use config::FilesystemBlobConfig;
pub use store::FilesystemBlobStore;
