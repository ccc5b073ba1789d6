//! Per-user vote record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Demographics;
use crate::value_objects::{VoteCategory, VoteKind};

/// The single bucket a user contributes to for one vote kind.
///
/// Stored at `users/{u}/votes/{figureId}_{kind}` for figure votes and at
/// `.../votes/{userId}` under a comment or reply for reactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub kind: VoteKind,
    pub value: String,
    pub user_country: String,
    pub user_gender: String,
    pub updated_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new<C: VoteCategory>(
        category: C,
        demographics: Demographics,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: C::KIND,
            value: category.as_str().to_string(),
            user_country: demographics.country,
            user_gender: demographics.gender,
            updated_at: now,
        }
    }

    /// Stored value as a typed category, `None` when it is not one of `C`
    pub fn category<C: VoteCategory>(&self) -> Option<C> {
        if self.kind == C::KIND {
            C::parse(&self.value)
        } else {
            None
        }
    }
}
