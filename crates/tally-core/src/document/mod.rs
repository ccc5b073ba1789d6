//! Document model shared by every store implementation
//!
//! Documents are JSON objects addressed by slash-separated paths. Writes are
//! buffered as [`WriteOp`]s and applied with [`apply_writes`], so the memory
//! and PostgreSQL stores produce identical results for the same batch.

mod field;
mod path;
pub mod paths;
mod write;

pub use field::{decode, encode, read_i64, FieldPath};
pub use path::{CollectionPath, DocPath};
pub use write::{apply_writes, WriteBuffer, WriteOp};

/// A stored document body
pub type Document = serde_json::Map<String, serde_json::Value>;
