//! Traits (ports) - interfaces the infrastructure layer implements

mod document_store;

pub use document_store::{get_typed, set_typed, DocumentStore, RepoResult, Transaction};
