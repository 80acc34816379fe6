pub mod access;
pub mod document;
pub mod error;
pub mod filter;
pub mod requester;
pub mod types;

pub use access::{has_delete_access, has_grant_access, has_read_access};
pub use document::{Document, DocumentDraft};
pub use error::ValidationError;
pub use filter::{DocumentFilter, FilterKey};
pub use requester::Requester;
pub use types::{DocumentId, Login, UserId};
