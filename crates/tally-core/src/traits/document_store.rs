//! Document store ports
//!
//! The engine only talks to storage through these traits. A transaction
//! performs all of its reads first, then buffers writes; the whole batch is
//! applied atomically by [`Transaction::commit`], which fails with
//! [`DomainError::TransactionConflict`] when anything read has changed since.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{decode, encode, CollectionPath, DocPath, Document, FieldPath, WriteOp};
use crate::error::DomainError;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Document Store
// ============================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document outside any transaction
    async fn get(&self, path: &DocPath) -> RepoResult<Option<Document>>;

    /// Direct children of a collection ordered by path, starting strictly
    /// after `start_after` when given
    async fn list_after(
        &self,
        collection: &CollectionPath,
        start_after: Option<&DocPath>,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>>;

    /// Direct children of a collection ordered by path
    async fn list(
        &self,
        collection: &CollectionPath,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>> {
        self.list_after(collection, None, limit).await
    }

    /// Open a new atomic transaction
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>>;
}

// ============================================================================
// Transaction
// ============================================================================

#[async_trait]
pub trait Transaction: Send {
    /// Read a document; fails once any write has been buffered
    async fn get(&mut self, path: &DocPath) -> RepoResult<Option<Document>>;

    /// List direct children; the listing is validated at commit like a read
    async fn list(
        &mut self,
        collection: &CollectionPath,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>>;

    /// Buffer a write
    fn write(&mut self, op: WriteOp);

    /// Number of buffered writes
    fn pending_writes(&self) -> usize;

    /// Apply every buffered write atomically
    async fn commit(self: Box<Self>) -> RepoResult<()>;

    /// Discard the transaction
    async fn rollback(self: Box<Self>) -> RepoResult<()>;

    fn set(&mut self, path: DocPath, document: Document) {
        self.write(WriteOp::Set { path, document });
    }

    fn merge(&mut self, path: DocPath, fields: Document) {
        self.write(WriteOp::Merge { path, fields });
    }

    fn increment(&mut self, path: DocPath, field: FieldPath, delta: i64) {
        if delta != 0 {
            self.write(WriteOp::Increment { path, field, delta });
        }
    }

    fn delete(&mut self, path: DocPath) {
        self.write(WriteOp::Delete { path });
    }
}

/// Read and decode a typed record inside a transaction
pub async fn get_typed<T: DeserializeOwned>(
    tx: &mut dyn Transaction,
    path: &DocPath,
) -> RepoResult<Option<T>> {
    match tx.get(path).await? {
        Some(doc) => decode(path, doc).map(Some),
        None => Ok(None),
    }
}

/// Encode a typed record and buffer it as a full-document set
pub fn set_typed<T: Serialize>(
    tx: &mut dyn Transaction,
    path: DocPath,
    value: &T,
) -> RepoResult<()> {
    tx.set(path, encode(value)?);
    Ok(())
}
