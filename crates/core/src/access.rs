//! Authorization predicates over a resolved document.
//!
//! Ownership is compared by user ID while grants are matched by login. A
//! renamed or reused login therefore inherits the grants recorded under the
//! old name; callers that allow login changes must revoke grants first.

use crate::document::Document;
use crate::requester::Requester;

/// Public documents, the owner, and grantees may read.
#[must_use]
pub fn has_read_access(doc: &Document, requester: &Requester) -> bool {
    doc.is_public || doc.owner_id == requester.id || doc.is_granted_to(&requester.login)
}

/// Only the owner may delete. Grants never confer delete rights.
#[must_use]
pub fn has_delete_access(doc: &Document, requester: &Requester) -> bool {
    doc.owner_id == requester.id
}

/// Only the owner may change who else can read.
#[must_use]
pub fn has_grant_access(doc: &Document, requester: &Requester) -> bool {
    doc.owner_id == requester.id
}
