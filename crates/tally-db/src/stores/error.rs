//! Error handling utilities for stores

use sqlx::Error as SqlxError;
use tally_core::DomainError;

/// SQLSTATE for `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError; lost serialization races become conflicts
pub fn map_db_error(e: SqlxError) -> DomainError {
    if is_retryable(&e) {
        DomainError::TransactionConflict
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

fn is_retryable(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED)
}
