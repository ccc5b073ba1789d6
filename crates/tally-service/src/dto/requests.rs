//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Vote Requests
// ============================================================================

/// Figure vote with a raw category name, checked against the kind's enum
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CastVoteRequest {
    #[validate(length(min = 1, max = 32, message = "Vote value must be 1-32 characters"))]
    pub value: String,
}

// ============================================================================
// Comment Requests
// ============================================================================

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostCommentRequest {
    /// `-1` posts the comment without a rating
    #[validate(range(min = -1, max = 5, message = "Rating must be between -1 and 5"))]
    #[serde(default = "unrated")]
    pub rating: i32,

    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub text: String,

    #[validate(length(max = 32, message = "Tag must be at most 32 characters"))]
    pub tag: Option<String>,
}

fn unrated() -> i32 {
    -1
}

impl PostCommentRequest {
    pub fn new(rating: i32, text: impl Into<String>) -> Self {
        Self {
            rating,
            text: text.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Create reply request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostReplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Reply must be 1-2000 characters"))]
    pub text: String,
}

impl PostReplyRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
