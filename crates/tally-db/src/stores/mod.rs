//! Document store implementations
//!
//! Both stores buffer writes in a [`tally_core::WriteBuffer`] and resolve the
//! final state of each touched document with the same `apply_writes`, so
//! they agree on the outcome of any batch.

mod error;
mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
