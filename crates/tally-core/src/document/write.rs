//! Buffered transactional writes

use super::{DocPath, Document, FieldPath};
use crate::error::DomainError;

/// A single buffered mutation
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the whole document
    Set { path: DocPath, document: Document },
    /// Upsert top-level fields, leaving the others untouched
    Merge { path: DocPath, fields: Document },
    /// Atomically add `delta` to a (nested) numeric field, creating the document if needed
    Increment {
        path: DocPath,
        field: FieldPath,
        delta: i64,
    },
    Delete { path: DocPath },
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Set { path, .. }
            | Self::Merge { path, .. }
            | Self::Increment { path, .. }
            | Self::Delete { path } => path,
        }
    }

    fn apply(&self, current: Option<Document>) -> Option<Document> {
        match self {
            Self::Set { document, .. } => Some(document.clone()),
            Self::Merge { fields, .. } => {
                let mut doc = current.unwrap_or_default();
                for (key, value) in fields {
                    doc.insert(key.clone(), value.clone());
                }
                Some(doc)
            }
            Self::Increment { field, delta, .. } => {
                let mut doc = current.unwrap_or_default();
                field.increment(&mut doc, *delta);
                Some(doc)
            }
            Self::Delete { .. } => None,
        }
    }
}

/// Apply every op targeting one document, in order
pub fn apply_writes<'a>(
    current: Option<Document>,
    ops: impl IntoIterator<Item = &'a WriteOp>,
) -> Option<Document> {
    ops.into_iter().fold(current, |doc, op| op.apply(doc))
}

/// Write buffer shared by transaction implementations.
///
/// Enforces the read-before-write discipline: once any write has been
/// buffered, further reads in the same transaction are rejected.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    ops: Vec<WriteOp>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if a read is attempted after writes were buffered
    pub fn guard_read(&self, path: &str) -> Result<(), DomainError> {
        if self.ops.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ReadAfterWrite(path.to_string()))
        }
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Distinct touched paths in first-touch order
    pub fn touched_paths(&self) -> Vec<DocPath> {
        let mut seen: Vec<DocPath> = Vec::new();
        for op in &self.ops {
            if !seen.contains(op.path()) {
                seen.push(op.path().clone());
            }
        }
        seen
    }

    /// Ops targeting one path, in buffer order
    pub fn ops_for<'a>(&'a self, path: &'a DocPath) -> impl Iterator<Item = &'a WriteOp> + 'a {
        self.ops.iter().filter(move |op| op.path() == path)
    }

    /// Final state of every touched document given a loader for current state
    pub fn resolve<F>(&self, mut load: F) -> Vec<(DocPath, Option<Document>)>
    where
        F: FnMut(&DocPath) -> Option<Document>,
    {
        self.touched_paths()
            .into_iter()
            .map(|path| {
                let next = apply_writes(load(&path), self.ops_for(&path));
                (path, next)
            })
            .collect()
    }
}
