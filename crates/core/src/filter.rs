use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::ValidationError;

/// Document fields that may appear in a [`DocumentFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Name,
    Mime,
}

impl FilterKey {
    /// Return the wire name of the key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Mime => "mime",
        }
    }

    /// Parse an allow-listed key. Returns `None` for anything else.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "mime" => Some(Self::Mime),
            _ => None,
        }
    }

    /// Read the field this key selects from a document.
    #[must_use]
    pub fn field_of(self, doc: &Document) -> &str {
        match self {
            Self::Name => &doc.name,
            Self::Mime => &doc.mime,
        }
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query descriptor for listing documents.
///
/// An empty key and value mean "no filter". A `limit` of zero means
/// "unbounded".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub key: String,
    pub value: String,
    pub limit: usize,
}

impl DocumentFilter {
    /// Create a filter from its raw parts.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, limit: usize) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            limit,
        }
    }

    /// Filter that only caps the number of results.
    #[must_use]
    pub fn limited(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Resolve the equality constraint carried by this filter.
    ///
    /// Returns `Ok(None)` for an unfiltered query.
    pub fn constraint(&self) -> Result<Option<(FilterKey, &str)>, ValidationError> {
        if self.key.is_empty() {
            if self.value.is_empty() {
                return Ok(None);
            }
            return Err(ValidationError::ValueWithoutKey(self.value.clone()));
        }

        FilterKey::parse(&self.key)
            .map(|key| Some((key, self.value.as_str())))
            .ok_or_else(|| ValidationError::UnsupportedFilterKey(self.key.clone()))
    }

    /// Check the filter against the allow-list.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.constraint().map(|_| ())
    }

    /// Returns `true` if [`validate`](Self::validate) would succeed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns `true` if `doc` satisfies the equality constraint.
    ///
    /// Invalid filters match nothing.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self.constraint() {
            Ok(None) => true,
            Ok(Some((key, value))) => key.field_of(doc) == value,
            Err(_) => false,
        }
    }
}
