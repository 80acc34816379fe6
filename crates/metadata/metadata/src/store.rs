use async_trait::async_trait;

use docvault_core::{Document, DocumentFilter, DocumentId, Login, UserId};

use crate::error::MetadataError;

/// Durable storage for document records and their grant lists.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Multi-row changes (grant replacement, delete with grants) must be atomic.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a new document record.
    ///
    /// Only the record itself is persisted; `doc.grants` is ignored and must
    /// be written with [`replace_grants`](Self::replace_grants). A duplicate
    /// ID fails with [`MetadataError::UniqueViolation`].
    async fn create(&self, doc: &Document) -> Result<(), MetadataError>;

    /// Fetch a document with its grants.
    async fn by_id(&self, id: &DocumentId) -> Result<Document, MetadataError>;

    /// Every document owned by `owner`.
    async fn by_owner(&self, owner: &UserId) -> Result<Vec<Document>, MetadataError>;

    /// Remove a document and its grants.
    async fn delete(&self, id: &DocumentId) -> Result<(), MetadataError>;

    /// Replace the full grant set of a document.
    async fn replace_grants(&self, id: &DocumentId, logins: &[Login])
    -> Result<(), MetadataError>;

    /// Every document that lists `login` among its grants.
    async fn documents_granted_to(&self, login: &Login) -> Result<Vec<Document>, MetadataError>;

    /// Documents visible to `requester` that satisfy the filters.
    ///
    /// Visibility must follow the read-access rule: public, owned by the
    /// requester, or granted to the requester's login. `owner_login`, when
    /// set, restricts results to documents owned by that login. Results are
    /// ordered by name ascending then creation time descending and capped at
    /// `filter.limit` when it is non-zero.
    async fn filtered(
        &self,
        owner_login: Option<&Login>,
        requester: &UserId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, MetadataError>;
}
