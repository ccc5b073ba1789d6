//! Document and collection paths

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Path of a single document: an even number of non-empty segments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath(String);

/// Path of a collection: an odd number of non-empty segments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath(String);

fn segment_count(raw: &str) -> Option<usize> {
    let mut count = 0;
    for segment in raw.split('/') {
        if segment.is_empty() {
            return None;
        }
        count += 1;
    }
    Some(count)
}

impl DocPath {
    /// Parse a raw path read back from storage
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        match segment_count(&raw) {
            Some(n) if n % 2 == 0 => Ok(Self(raw)),
            _ => Err(DomainError::InvalidPath(raw)),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment (the document id)
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Collection containing this document
    pub fn parent(&self) -> CollectionPath {
        let cut = self.0.rfind('/').unwrap_or(0);
        CollectionPath(self.0[..cut].to_string())
    }

    /// Sub-collection owned by this document
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{name}", self.0))
    }

    /// True when `other` lives anywhere beneath this document
    pub fn is_ancestor_of(&self, other: &DocPath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }
}

impl CollectionPath {
    /// Root collection (e.g. `figures`)
    pub(crate) fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document with the given id inside this collection
    pub fn doc(&self, id: &str) -> DocPath {
        DocPath(format!("{}/{id}", self.0))
    }

    /// Prefix every direct child path starts with
    pub fn child_prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// True when `path` is a direct child document of this collection
    pub fn contains(&self, path: &DocPath) -> bool {
        path.as_str()
            .strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|id| !id.is_empty() && !id.contains('/'))
    }
}

impl TryFrom<String> for DocPath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
