use serde::{Deserialize, Serialize};

use crate::types::{Login, UserId};

/// Resolved identity on whose behalf an operation executes.
///
/// Token handling happens before the core is reached; only the resolved
/// pair travels through the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// User identifier, compared against [`Document::owner_id`](crate::Document::owner_id).
    pub id: UserId,
    /// User login, matched against a document's grant list.
    pub login: Login,
}

impl Requester {
    /// Create a requester from an ID and a login.
    #[must_use]
    pub fn new(id: impl Into<UserId>, login: impl Into<Login>) -> Self {
        Self {
            id: id.into(),
            login: login.into(),
        }
    }
}
