//! # tally-db
//!
//! Document store implementations behind the `DocumentStore` port defined in
//! `tally-core`.
//!
//! ## Overview
//!
//! - [`MemoryDocumentStore`]: process-local store with optimistic,
//!   version-validated commits. Used by tests and single-node deployments.
//! - [`PgDocumentStore`]: PostgreSQL store keeping every document as a JSONB
//!   row and running each transaction at SERIALIZABLE isolation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_db::{create_pool, ensure_schema, PgDocumentStore, PoolConfig};
//!
//! async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new(url)).await?;
//!     ensure_schema(&pool).await?;
//!     let store = Arc::new(PgDocumentStore::new(pool));
//!     // Hand the store to the service layer...
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pool;
pub mod stores;

// Re-export commonly used types
pub use pool::{create_pool, ensure_schema, PgPool, PoolConfig};
pub use stores::{MemoryDocumentStore, PgDocumentStore};
