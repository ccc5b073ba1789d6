//! Data transfer objects for service requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for service inputs
//! - Response DTOs serialized in the document layer's camelCase

pub mod requests;
pub mod responses;

pub use requests::{CastVoteRequest, PostCommentRequest, PostReplyRequest};

pub use responses::{
    CastVoteResponse, DeleteOutcome, FigureView, LeaderboardEntry, PostCommentResponse,
    PostReplyResponse, RecordActivityResponse, StreakView,
};
