use thiserror::Error;

/// Errors from metadata store operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The addressed document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// An insert collided with an existing row.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl MetadataError {
    /// Returns `true` for [`MetadataError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
