use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use docvault_core::{DocumentFilter, DocumentId, Login};

/// Prefix shared by list entries and per-user index entries.
pub const LIST_PREFIX: &str = "docs";

/// Characters escaped inside a list key segment. Ordinary logins and filter
/// values render unchanged; `:` and `%` are escaped so that distinct tuples
/// never render to the same string.
const SEGMENT: &AsciiSet = &CONTROLS.add(b':').add(b'%');

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// Arguments of one list query, as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListKey {
    pub requester_login: Login,
    /// Owner-login filter; empty means "any owner".
    pub owner_login: String,
    pub filter_key: String,
    pub filter_value: String,
    pub limit: usize,
}

impl ListKey {
    /// Build the key for a list query.
    #[must_use]
    pub fn new(requester_login: &Login, owner_login: Option<&Login>, filter: &DocumentFilter) -> Self {
        Self {
            requester_login: requester_login.clone(),
            owner_login: owner_login.map(ToString::to_string).unwrap_or_default(),
            filter_key: filter.key.clone(),
            filter_value: filter.value.clone(),
            limit: filter.limit,
        }
    }
}

/// Addresses one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheKey {
    /// Serialized metadata of a single document.
    Document { id: DocumentId },
    /// Serialized result of one list query.
    List(ListKey),
    /// Per-user "my documents changed" entry. Holds the list keys cached on
    /// behalf of that login.
    UserDocs { login: Login },
}

impl CacheKey {
    #[must_use]
    pub fn document(id: &DocumentId) -> Self {
        Self::Document { id: id.clone() }
    }

    #[must_use]
    pub fn list(requester_login: &Login, owner_login: Option<&Login>, filter: &DocumentFilter) -> Self {
        Self::List(ListKey::new(requester_login, owner_login, filter))
    }

    #[must_use]
    pub fn user_docs(login: &Login) -> Self {
        Self::UserDocs {
            login: login.clone(),
        }
    }

    /// Return the canonical string form used by backends:
    ///
    /// - document: `{id}`
    /// - list: `docs:{requester}:{owner}:{key}:{value}:{limit}`
    /// - user docs: `docs:{login}`
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Document { id } => id.to_string(),
            Self::List(list) => format!(
                "{LIST_PREFIX}:{}:{}:{}:{}:{}",
                segment(&list.requester_login),
                segment(&list.owner_login),
                segment(&list.filter_key),
                segment(&list.filter_value),
                list.limit,
            ),
            Self::UserDocs { login } => format!("{LIST_PREFIX}:{}", segment(login)),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(s: &str) -> Login {
        Login::new(s)
    }

    #[test]
    fn document_key_is_the_id() {
        let id = DocumentId::new("0b6c1f2e-doc");
        assert_eq!(CacheKey::document(&id).canonical(), "0b6c1f2e-doc");
    }

    #[test]
    fn list_key_joins_all_arguments() {
        let filter = DocumentFilter::new("mime", "application/pdf", 10);
        let key = CacheKey::list(&login("alice"), Some(&login("bob")), &filter);
        assert_eq!(key.canonical(), "docs:alice:bob:mime:application/pdf:10");
    }

    #[test]
    fn unfiltered_list_key_keeps_empty_segments() {
        let key = CacheKey::list(&login("alice"), None, &DocumentFilter::default());
        assert_eq!(key.canonical(), "docs:alice::::0");
    }

    #[test]
    fn user_docs_key() {
        assert_eq!(CacheKey::user_docs(&login("alice")).canonical(), "docs:alice");
    }

    #[test]
    fn identical_arguments_render_identically() {
        let filter = DocumentFilter::new("name", "a", 1);
        let a = CacheKey::list(&login("u"), Some(&login("o")), &filter);
        let b = CacheKey::list(&login("u"), Some(&login("o")), &filter.clone());
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn separators_inside_segments_cannot_collide() {
        // Without escaping both would render as "docs:a:b::::0".
        let a = CacheKey::list(&login("a:b"), None, &DocumentFilter::default());
        let b = CacheKey::list(&login("a"), Some(&login("b")), &DocumentFilter::default());
        assert_ne!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "docs:a%3Ab::::0");
    }

    #[test]
    fn escape_character_is_itself_escaped() {
        let a = CacheKey::user_docs(&login("a%3Ab"));
        let b = CacheKey::user_docs(&login("a:b"));
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn serde_round_trip() {
        let key = CacheKey::list(&login("alice"), None, &DocumentFilter::limited(5));
        let json = serde_json::to_string(&key).unwrap();
        let back: CacheKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
