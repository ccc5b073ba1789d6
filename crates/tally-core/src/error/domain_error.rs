//! Domain errors - error types for the domain layer

use std::fmt;

use thiserror::Error;

use crate::value_objects::{CommentId, FigureId, IdParseError, ReplyId};

/// Coarse failure class every error maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    /// Lost an optimistic-concurrency race; safe to retry
    Conflict,
    InvalidArgument,
    /// Transient failure after retries were exhausted
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::AlreadyExists => "already_exists",
            Self::Conflict => "conflict",
            Self::InvalidArgument => "invalid_argument",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Figure not found: {0}")]
    FigureNotFound(FigureId),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("Reply not found: {0}")]
    ReplyNotFound(ReplyId),

    #[error("Streak not found")]
    StreakNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid {kind} value: {value}")]
    InvalidVoteCategory { kind: &'static str, value: String },

    #[error("Rating out of range (-1..=5): {0}")]
    RatingOutOfRange(i32),

    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] IdParseError),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not comment author")]
    NotCommentAuthor,

    #[error("Not reply author")]
    NotReplyAuthor,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("User already commented on figure {figure_id}")]
    CommentAlreadyExists { figure_id: FigureId },

    #[error("Transaction conflict")]
    TransactionConflict,

    // =========================================================================
    // Store Contract Violations
    // =========================================================================
    #[error("Read after write in transaction: {0}")]
    ReadAfterWrite(String),

    #[error("Corrupt document at {path}: {reason}")]
    CorruptDocument { path: String, reason: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::FigureNotFound(_) => "UNKNOWN_FIGURE",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::ReplyNotFound(_) => "UNKNOWN_REPLY",
            Self::StreakNotFound => "UNKNOWN_STREAK",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidVoteCategory { .. } => "INVALID_VOTE_CATEGORY",
            Self::RatingOutOfRange(_) => "RATING_OUT_OF_RANGE",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidPath(_) => "INVALID_PATH",

            // Authorization
            Self::NotCommentAuthor => "NOT_COMMENT_AUTHOR",
            Self::NotReplyAuthor => "NOT_REPLY_AUTHOR",

            // Conflict
            Self::CommentAlreadyExists { .. } => "COMMENT_ALREADY_EXISTS",
            Self::TransactionConflict => "TRANSACTION_CONFLICT",

            // Store contract
            Self::ReadAfterWrite(_) => "READ_AFTER_WRITE",
            Self::CorruptDocument { .. } => "CORRUPT_DOCUMENT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FigureNotFound(_)
            | Self::CommentNotFound(_)
            | Self::ReplyNotFound(_)
            | Self::StreakNotFound => ErrorKind::NotFound,

            Self::ValidationError(_)
            | Self::InvalidVoteCategory { .. }
            | Self::RatingOutOfRange(_)
            | Self::InvalidId(_)
            | Self::InvalidPath(_) => ErrorKind::InvalidArgument,

            Self::NotCommentAuthor | Self::NotReplyAuthor => ErrorKind::PermissionDenied,

            Self::CommentAlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::TransactionConflict => ErrorKind::Conflict,

            Self::ReadAfterWrite(_)
            | Self::CorruptDocument { .. }
            | Self::DatabaseError(_)
            | Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// Check if the whole transaction may be re-run
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}
