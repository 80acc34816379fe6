use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use docvault_core::{Document, DocumentFilter, DocumentId, Login, Requester, UserId, access};
use docvault_metadata::error::MetadataError;
use docvault_metadata::store::MetadataStore;

/// In-memory metadata store using `DashMap`. Suitable for development and
/// testing.
///
/// Documents are keyed by ID with their grant lists stored inline. A user
/// directory maps user IDs to logins so that owner-login filters and
/// grant-based visibility can be evaluated the way a relational join would.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    documents: DashMap<DocumentId, Document>,
    users: DashMap<UserId, Login>,
}

impl MemoryMetadataStore {
    /// Create a new, empty store with an empty user directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or rename) a user in the directory.
    pub fn register_user(&self, id: impl Into<UserId>, login: impl Into<Login>) {
        self.users.insert(id.into(), login.into());
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no document is stored.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn login_of(&self, id: &UserId) -> Option<Login> {
        self.users.get(id).map(|l| l.value().clone())
    }

    fn id_of(&self, login: &Login) -> Option<UserId> {
        self.users
            .iter()
            .find(|entry| entry.value() == login)
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create(&self, doc: &Document) -> Result<(), MetadataError> {
        match self.documents.entry(doc.id.clone()) {
            Entry::Occupied(_) => Err(MetadataError::UniqueViolation {
                constraint: "documents_pkey".to_owned(),
            }),
            Entry::Vacant(vacant) => {
                let mut record = doc.clone();
                record.grants.clear();
                vacant.insert(record);
                Ok(())
            }
        }
    }

    async fn by_id(&self, id: &DocumentId) -> Result<Document, MetadataError> {
        self.documents
            .get(id)
            .map(|d| d.value().clone())
            .ok_or_else(|| MetadataError::NotFound(id.to_string()))
    }

    async fn by_owner(&self, owner: &UserId) -> Result<Vec<Document>, MetadataError> {
        Ok(self
            .documents
            .iter()
            .filter(|d| d.owner_id == *owner)
            .map(|d| d.value().clone())
            .collect())
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), MetadataError> {
        self.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MetadataError::NotFound(id.to_string()))
    }

    async fn replace_grants(
        &self,
        id: &DocumentId,
        logins: &[Login],
    ) -> Result<(), MetadataError> {
        let mut doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| MetadataError::NotFound(id.to_string()))?;
        doc.grants = logins.to_vec();
        Ok(())
    }

    async fn documents_granted_to(&self, login: &Login) -> Result<Vec<Document>, MetadataError> {
        Ok(self
            .documents
            .iter()
            .filter(|d| d.is_granted_to(login))
            .map(|d| d.value().clone())
            .collect())
    }

    async fn filtered(
        &self,
        owner_login: Option<&Login>,
        requester: &UserId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, MetadataError> {
        // A requester missing from the directory has no login, so no grant
        // can match; public and owned documents remain visible.
        let viewer = self.login_of(requester).map(|login| Requester {
            id: requester.clone(),
            login,
        });
        let visible = |doc: &Document| match &viewer {
            Some(viewer) => access::has_read_access(doc, viewer),
            None => doc.is_public || doc.owner_id == *requester,
        };

        let owner = match owner_login {
            Some(login) => match self.id_of(login) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let mut matching: Vec<Document> = self
            .documents
            .iter()
            .filter(|d| visible(d.value()))
            .filter(|d| owner.as_ref().is_none_or(|o| d.owner_id == *o))
            .filter(|d| filter.matches(d.value()))
            .map(|d| d.value().clone())
            .collect();

        matching.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        if filter.limit > 0 {
            matching.truncate(filter.limit);
        }

        Ok(matching)
    }
}
