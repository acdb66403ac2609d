//! Content collaborator seams
//!
//! The orchestrator only ever talks to these traits. The DeviantArt client
//! implements both; tests use in-memory fakes.

use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::CollaboratorError;
use crate::navigation::DocumentSequence;

/// Result type for collaborator calls
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Fields that must be sent back unchanged on submit
///
/// Opaque to the core. An ordered map so artifacts and requests are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreservedFields(BTreeMap<String, Value>);

impl PreservedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert `value` only when `key` is absent or null
    pub fn ensure(&mut self, key: &str, value: Value) {
        let missing = matches!(self.0.get(key), None | Some(Value::Null));
        if missing {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for PreservedFields {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Current body of a document plus everything needed to resubmit it
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub body: String,
    pub preserved: PreservedFields,
}

/// Where documents come from
pub trait ContentSource {
    /// Literature documents of a gallery in the service's native order
    ///
    /// Classification comes from the service, never from inspecting text.
    fn list_ordered_literature(&self, gallery_handle: &str) -> CollaboratorResult<DocumentSequence>;

    /// Current body and preserved fields of one document
    fn fetch_body(&self, id: &str) -> CollaboratorResult<FetchedDocument>;
}

/// Where edited documents go
pub trait ContentSink {
    /// Replace the body of `id`, resending `preserved` verbatim
    fn submit(&self, id: &str, new_body: &str, preserved: &PreservedFields) -> CollaboratorResult<()>;
}
