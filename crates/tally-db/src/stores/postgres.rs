//! PostgreSQL document store
//!
//! Documents live in a single `documents` table keyed by path, with the
//! parent collection path indexed for child listings. Each transaction runs
//! at SERIALIZABLE isolation, so a lost race surfaces from PostgreSQL as a
//! serialization failure and is reported as a conflict.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};

use tally_core::{
    apply_writes, CollectionPath, DocPath, Document, DocumentStore, RepoResult, Transaction,
    WriteBuffer, WriteOp,
};

use super::error::map_db_error;
use crate::models::DocumentRow;

/// PostgreSQL implementation of [`DocumentStore`]
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new PgDocumentStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn limit_param(limit: Option<usize>) -> Option<i64> {
    limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, path: &DocPath) -> RepoResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT path, data
            FROM documents
            WHERE path = $1
            ",
        )
        .bind(path.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|r| r.data.0))
    }

    #[instrument(skip(self))]
    async fn list_after(
        &self,
        collection: &CollectionPath,
        start_after: Option<&DocPath>,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT path, data
            FROM documents
            WHERE parent = $1
              AND ($2::text IS NULL OR path > $2)
            ORDER BY path
            LIMIT $3
            ",
        )
        .bind(collection.as_str())
        .bind(start_after.map(DocPath::as_str))
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(DocumentRow::into_parts).collect()
    }

    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        Ok(Box::new(PgTransaction {
            tx,
            writes: WriteBuffer::new(),
        }))
    }
}

/// Transaction over a [`PgDocumentStore`]
struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
    writes: WriteBuffer,
}

impl PgTransaction {
    async fn apply(&mut self, path: &DocPath) -> RepoResult<()> {
        let current = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT path, data
            FROM documents
            WHERE path = $1
            FOR UPDATE
            ",
        )
        .bind(path.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?
        .map(|r| r.data.0);

        match apply_writes(current, self.writes.ops_for(path)) {
            Some(document) => {
                sqlx::query(
                    r"
                    INSERT INTO documents (path, parent, data, version, updated_at)
                    VALUES ($1, $2, $3, 1, now())
                    ON CONFLICT (path) DO UPDATE
                    SET data = EXCLUDED.data,
                        version = documents.version + 1,
                        updated_at = now()
                    ",
                )
                .bind(path.as_str())
                .bind(path.parent().as_str())
                .bind(Json(Value::Object(document)))
                .execute(&mut *self.tx)
                .await
                .map_err(map_db_error)?;
            }
            None => {
                sqlx::query("DELETE FROM documents WHERE path = $1")
                    .bind(path.as_str())
                    .execute(&mut *self.tx)
                    .await
                    .map_err(map_db_error)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn get(&mut self, path: &DocPath) -> RepoResult<Option<Document>> {
        self.writes.guard_read(path.as_str())?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT path, data
            FROM documents
            WHERE path = $1
            ",
        )
        .bind(path.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|r| r.data.0))
    }

    async fn list(
        &mut self,
        collection: &CollectionPath,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>> {
        self.writes.guard_read(collection.as_str())?;
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT path, data
            FROM documents
            WHERE parent = $1
            ORDER BY path
            LIMIT $2
            ",
        )
        .bind(collection.as_str())
        .bind(limit_param(limit))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(DocumentRow::into_parts).collect()
    }

    fn write(&mut self, op: WriteOp) {
        self.writes.push(op);
    }

    fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    async fn commit(mut self: Box<Self>) -> RepoResult<()> {
        let touched = self.writes.touched_paths();
        for path in &touched {
            self.apply(path).await?;
        }
        let this = *self;
        this.tx.commit().await.map_err(map_db_error)?;
        debug!(documents = touched.len(), "postgres transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
