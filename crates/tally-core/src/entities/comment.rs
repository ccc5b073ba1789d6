//! Comment, reply, and the one-comment-per-user marker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Demographics;
use crate::value_objects::{CommentId, Rating, UserId};

/// Top-level comment (`figures/{f}/comments/{c}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_id: UserId,
    #[serde(default)]
    pub rating: Rating,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    #[serde(default)]
    pub reply_count: i64,
    pub user_country: String,
    pub user_gender: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        user_id: UserId,
        rating: Rating,
        text: String,
        tag: Option<String>,
        demographics: Demographics,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            rating,
            text,
            tag,
            likes: 0,
            dislikes: 0,
            reply_count: 0,
            user_country: demographics.country,
            user_gender: demographics.gender,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn demographics(&self) -> Demographics {
        Demographics::new(Some(&self.user_country), Some(&self.user_gender))
    }
}

/// Reply under a comment (`.../comments/{c}/replies/{r}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub user_id: UserId,
    pub parent_id: CommentId,
    pub text: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    pub user_country: String,
    pub user_gender: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(
        user_id: UserId,
        parent_id: CommentId,
        text: String,
        demographics: Demographics,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            parent_id,
            text,
            likes: 0,
            dislikes: 0,
            user_country: demographics.country,
            user_gender: demographics.gender,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Marks that a user holds the single live comment on a figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthorMarker {
    pub comment_id: CommentId,
    pub created_at: DateTime<Utc>,
}
