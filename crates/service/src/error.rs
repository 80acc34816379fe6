use thiserror::Error;

use docvault_core::ValidationError;

/// Caller-facing errors of [`DocumentService`](crate::DocumentService).
///
/// `NotFound`, `Forbidden` and `InvalidParams` are always surfaced as
/// themselves; every store or serialization failure beyond those collapses
/// into `Internal`. Cache failures never surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed document (or its content) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requester lacks the right for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A filter or payload was rejected before any store was queried.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A store or serialization failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// The service was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidParams(e.to_string())
    }
}

impl ServiceError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}
