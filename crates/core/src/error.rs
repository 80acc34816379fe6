use thiserror::Error;

/// Input rejected before any store is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The filter key is not in the allow-list.
    #[error("unsupported filter key: {0}")]
    UnsupportedFilterKey(String),

    /// A filter value was supplied without a key.
    #[error("filter value {0:?} supplied without a key")]
    ValueWithoutKey(String),

    /// Inline document payload is not valid JSON.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
}
