use thiserror::Error;

/// Errors from cache backend operations.
///
/// Absence of a key is never an error; see [`Cache::get`](crate::Cache::get).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
