//! Integration test utilities for the engagement engine
//!
//! This crate provides helpers for running end-to-end scenarios against the
//! services, backed by the in-memory store or PostgreSQL when configured.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
