//! Field paths into nested document maps, plus typed encode/decode

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::{DocPath, Document};
use crate::error::DomainError;

/// Path to a (possibly nested) field inside a document.
///
/// Segments are kept separately, so map keys such as country codes may
/// contain any character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(field: impl Into<String>) -> Self {
        Self(vec![field.into()])
    }

    /// Descend one level into a nested map
    pub fn child(mut self, key: impl Into<String>) -> Self {
        self.0.push(key.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Read the field, `None` when any level is missing
    pub fn get<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        let mut current = doc.get(first)?;
        for key in rest {
            current = current.as_object()?.get(key)?;
        }
        Some(current)
    }

    /// Write the field, creating (or replacing non-map) intermediate levels
    pub fn set(&self, doc: &mut Document, value: Value) {
        let Some((last, parents)) = self.0.split_last() else {
            return;
        };
        let mut current = doc;
        for key in parents {
            let entry = current
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced by an object"),
            };
        }
        current.insert(last.clone(), value);
    }

    /// Add `delta` to a numeric field; a missing or non-numeric field counts as zero
    pub fn increment(&self, doc: &mut Document, delta: i64) {
        let next = read_i64(doc, self).saturating_add(delta);
        self.set(doc, Value::from(next));
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Read a numeric field with zero-default semantics
pub fn read_i64(doc: &Document, field: &FieldPath) -> i64 {
    field.get(doc).and_then(Value::as_i64).unwrap_or(0)
}

/// Serialize a typed record into a document body
pub fn encode<T: Serialize>(value: &T) -> Result<Document, DomainError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::InternalError(
            "record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(DomainError::InternalError(e.to_string())),
    }
}

/// Deserialize a stored document into a typed record
pub fn decode<T: DeserializeOwned>(path: &DocPath, doc: Document) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| DomainError::CorruptDocument {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
