//! Response DTOs
//!
//! All response DTOs implement `Serialize`, using camelCase keys to match the
//! stored documents.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use tally_core::{CommentId, Figure, FigureId, RatingBreakdown, ReplyId, Streak, UserId};

// ============================================================================
// Votes
// ============================================================================

/// Outcome of a toggle vote; `new_value` is `None` after a retraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentResponse {
    pub comment_id: CommentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReplyResponse {
    pub reply_id: ReplyId,
}

/// What a delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Owned children removed in the main transaction
    pub children_deleted: usize,
    /// Children removed afterwards in follow-up batches
    pub children_deferred: usize,
    /// A follow-up batch failed and children remain under the deleted item;
    /// `CommentService::purge_orphans` removes them
    pub children_orphaned: bool,
}

// ============================================================================
// Figures
// ============================================================================

/// Figure aggregates together with the per-star breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureView {
    pub id: FigureId,
    #[serde(flatten)]
    pub figure: Figure,
    pub average_rating: Option<f64>,
    /// Keyed by star value; stars nobody picked are absent
    pub rating_stats: BTreeMap<u8, RatingBreakdown>,
}

impl FigureView {
    pub fn breakdown(&self, star: u8) -> RatingBreakdown {
        self.rating_stats.get(&star).cloned().unwrap_or_default()
    }
}

// ============================================================================
// Streaks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordActivityResponse {
    pub streak_gained: bool,
    pub new_streak: i64,
}

/// A stored streak as seen on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakView {
    pub user_id: UserId,
    pub figure_id: FigureId,
    pub active: bool,
    /// Zero once the streak lapsed
    pub displayed_streak: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_activity_date: NaiveDate,
}

impl StreakView {
    pub fn on(streak: &Streak, today: NaiveDate) -> Self {
        Self {
            user_id: streak.user_id.clone(),
            figure_id: streak.figure_id.clone(),
            active: streak.is_active_on(today),
            displayed_streak: streak.displayed_streak(today),
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            last_activity_date: streak.last_activity_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub current_streak: i64,
    pub last_activity_date: NaiveDate,
}

impl From<Streak> for LeaderboardEntry {
    fn from(streak: Streak) -> Self {
        Self {
            user_id: streak.user_id,
            current_streak: streak.current_streak,
            last_activity_date: streak.last_activity_date,
        }
    }
}
