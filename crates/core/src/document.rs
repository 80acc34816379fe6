use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{DocumentId, Login, UserId};

/// A stored document: either a blob-backed file or an inline JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier assigned at creation.
    pub id: DocumentId,
    /// The user that created the document.
    pub owner_id: UserId,
    /// Display name (usually the original filename).
    pub name: String,
    /// MIME content type.
    pub mime: String,
    /// `true` when content lives in the blob store.
    pub is_file: bool,
    /// `true` when every requester may read the document.
    pub is_public: bool,
    /// Blob locator, derived from the ID at creation. Never caller-supplied.
    #[serde(default)]
    pub path: String,
    /// Inline JSON payload for non-file documents.
    #[serde(default, with = "base64_bytes")]
    pub json_data: Vec<u8>,
    /// Logins granted explicit read access, in display order.
    #[serde(default)]
    pub grants: Vec<Login>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Materialize a draft into a new document owned by `owner`.
    ///
    /// Assigns a fresh ID and the current timestamp.
    #[must_use]
    pub fn from_draft(draft: DocumentDraft, owner: UserId) -> Self {
        let id = DocumentId::generate();
        Self {
            path: id.to_string(),
            id,
            owner_id: owner,
            name: draft.name,
            mime: draft.mime,
            is_file: draft.is_file,
            is_public: draft.is_public,
            json_data: draft.json_data,
            grants: draft.grants,
            created_at: Utc::now(),
        }
    }

    /// Key under which blob stores address this document's content.
    ///
    /// Always the document ID, so no two documents share a blob.
    #[must_use]
    pub fn blob_key(&self) -> &str {
        self.id.as_str()
    }

    /// Returns `true` if `login` appears in the grant list.
    #[must_use]
    pub fn is_granted_to(&self, login: &Login) -> bool {
        self.grants.contains(login)
    }

    /// Check that an inline payload, when present, is valid JSON.
    pub fn validate_payload(&self) -> Result<(), ValidationError> {
        if self.is_file || self.json_data.is_empty() {
            return Ok(());
        }
        serde_json::from_slice::<serde::de::IgnoredAny>(&self.json_data)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))
    }

    #[cfg(test)]
    pub(crate) fn test_fixture(owner: &str) -> Self {
        Self::from_draft(DocumentDraft::json("fixture", b"{}".to_vec()), owner.into())
    }
}

/// Caller-supplied fields of a document about to be uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub name: String,
    pub mime: String,
    pub is_file: bool,
    pub is_public: bool,
    #[serde(default, with = "base64_bytes")]
    pub json_data: Vec<u8>,
    #[serde(default)]
    pub grants: Vec<Login>,
}

impl DocumentDraft {
    /// Draft for a blob-backed file.
    #[must_use]
    pub fn file(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            is_file: true,
            ..Self::default()
        }
    }

    /// Draft for an inline JSON document.
    #[must_use]
    pub fn json(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: "application/json".to_owned(),
            json_data: data,
            ..Self::default()
        }
    }

    /// Mark the draft public or private.
    #[must_use]
    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Grant read access to the given logins.
    #[must_use]
    pub fn grants<I, L>(mut self, logins: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Login>,
    {
        self.grants = logins.into_iter().map(Into::into).collect();
        self
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_draft_assigns_identity_and_owner() {
        let draft = DocumentDraft::file("report.pdf", "application/pdf")
            .public(true)
            .grants(["bob"]);
        let doc = Document::from_draft(draft, UserId::new("u-1"));

        assert!(!doc.id.is_empty());
        assert_eq!(doc.owner_id.as_str(), "u-1");
        assert!(doc.is_file);
        assert!(doc.is_public);
        assert_eq!(doc.grants, vec![Login::new("bob")]);
    }

    #[test]
    fn blob_key_is_the_document_id() {
        let doc = Document::test_fixture("u-1");
        assert_eq!(doc.blob_key(), doc.id.as_str());
        assert_eq!(doc.path, doc.id.as_str());
    }

    #[test]
    fn stored_path_never_redirects_the_blob_key() {
        let mut doc = Document::test_fixture("u-1");
        doc.path = "someone-elses-blob".into();
        assert_eq!(doc.blob_key(), doc.id.as_str());
    }

    #[test]
    fn draft_ignores_a_supplied_path() {
        let draft: DocumentDraft = serde_json::from_value(serde_json::json!({
            "name": "f.bin",
            "mime": "application/octet-stream",
            "is_file": true,
            "is_public": false,
            "path": "victim-id",
        }))
        .unwrap();
        let doc = Document::from_draft(draft, UserId::new("u-1"));
        assert_eq!(doc.blob_key(), doc.id.as_str());
        assert_ne!(doc.path, "victim-id");
    }

    #[test]
    fn drafts_never_share_a_blob_key() {
        let a = Document::from_draft(DocumentDraft::file("same.bin", "x/y"), UserId::new("u-1"));
        let b = Document::from_draft(DocumentDraft::file("same.bin", "x/y"), UserId::new("u-2"));
        assert_ne!(a.blob_key(), b.blob_key());
    }

    #[test]
    fn json_payload_round_trips_as_base64() {
        let doc = Document::test_fixture("u-1");
        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(encoded["json_data"], "e30=");

        let decoded: Document = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn null_json_data_decodes_as_empty() {
        let doc = Document::test_fixture("u-1");
        let mut encoded = serde_json::to_value(&doc).unwrap();
        encoded["json_data"] = serde_json::Value::Null;
        let decoded: Document = serde_json::from_value(encoded).unwrap();
        assert!(decoded.json_data.is_empty());
    }

    #[test]
    fn validate_payload_rejects_malformed_json() {
        let mut doc = Document::test_fixture("u-1");
        assert!(doc.validate_payload().is_ok());

        doc.json_data = b"{not json".to_vec();
        assert!(matches!(
            doc.validate_payload(),
            Err(ValidationError::InvalidJson(_))
        ));

        doc.is_file = true;
        assert!(doc.validate_payload().is_ok(), "file documents carry no payload");
    }
}
