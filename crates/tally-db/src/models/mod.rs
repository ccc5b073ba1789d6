//! Database models - row shapes read back from PostgreSQL

mod document;

pub use document::DocumentRow;
