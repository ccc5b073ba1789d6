//! Daily activity streak for one (user, figure) pair

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FigureId, UserId};

/// Streak record, stored privately under the user and mirrored under the figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub user_id: UserId,
    pub figure_id: FigureId,
    pub current_streak: i64,
    #[serde(default)]
    pub longest_streak: i64,
    pub last_activity_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl Streak {
    /// First activity ever for this pair
    pub fn start(
        user_id: UserId,
        figure_id: FigureId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            figure_id,
            current_streak: 1,
            longest_streak: 1,
            last_activity_date: today,
            updated_at: now,
        }
    }

    /// Active while the last activity was today or yesterday
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.last_activity_date == today
            || today.checked_sub_days(Days::new(1)) == Some(self.last_activity_date)
    }

    /// Value to show a reader on `today`; an expired streak shows as zero
    pub fn displayed_streak(&self, today: NaiveDate) -> i64 {
        if self.is_active_on(today) {
            self.current_streak
        } else {
            0
        }
    }
}
