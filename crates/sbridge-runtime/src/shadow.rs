//! Shadow document store collaborator.
//!
//! Shadow documents fetched from the remote device-shadow service are kept in
//! a cache keyed by an opaque identifier for the lifetime of a multi-chunk
//! GET transaction. The cache is exclusively owned by this collaborator; the
//! dispatch core only reaches it through the [`ShadowStore`] trait.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// A fetched JSON shadow document.
pub type Document = Value;

/// Failures of the update operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// No document is cached under the given identifier.
    #[error("No such JSON identifier.")]
    NoSuchIdentifier,

    /// The cached document cannot hold keyed values.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// Any other update failure.
    #[error("{0}")]
    Other(String),
}

/// The shadow-document collaborator the JSON accessors drive.
pub trait ShadowStore {
    /// Look up the document cached under `identifier`.
    ///
    /// Called once per GET transaction, on the first-load sub-command only;
    /// continuation sub-commands never reach the store.
    fn document_by_identifier(&mut self, identifier: &str) -> Option<Document>;

    /// Look up `key` within a document and render its value for the wire.
    fn value_by_key(&self, document: &Document, key: &str) -> Option<String>;

    /// Create or replace `key` within the document cached under `identifier`.
    fn update_value(&mut self, identifier: &str, key: &str, value: &str) -> Result<(), UpdateError>;
}

/// In-memory JSON document cache.
///
/// Entries are created when a document is inserted (the "first load" of a
/// GET transaction) and live until explicitly evicted. Eviction policy is the
/// owner's call; the dispatch core never evicts.
#[derive(Debug, Default)]
pub struct JsonDocumentCache {
    documents: HashMap<String, Document>,
}

impl JsonDocumentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a document under an identifier, replacing any previous entry.
    pub fn insert(&mut self, identifier: impl Into<String>, document: Document) {
        self.documents.insert(identifier.into(), document);
    }

    /// Drop the entry for an identifier, returning the evicted document.
    pub fn evict(&mut self, identifier: &str) -> Option<Document> {
        self.documents.remove(identifier)
    }

    /// Check whether an identifier is cached.
    pub fn contains(&self, identifier: &str) -> bool {
        self.documents.contains_key(identifier)
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Render a JSON value for the wire: strings go out unquoted, everything
    /// else as compact JSON.
    fn render_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl ShadowStore for JsonDocumentCache {
    fn document_by_identifier(&mut self, identifier: &str) -> Option<Document> {
        self.documents.get(identifier).cloned()
    }

    fn value_by_key(&self, document: &Document, key: &str) -> Option<String> {
        document.get(key).map(Self::render_value)
    }

    fn update_value(&mut self, identifier: &str, key: &str, value: &str) -> Result<(), UpdateError> {
        let document = self
            .documents
            .get_mut(identifier)
            .ok_or(UpdateError::NoSuchIdentifier)?;
        let object = document.as_object_mut().ok_or(UpdateError::NotAnObject)?;

        // Numbers/booleans/structures arrive as their JSON text; anything
        // that does not parse as JSON is stored as a plain string.
        let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        object.insert(key.to_string(), parsed);
        Ok(())
    }
}
