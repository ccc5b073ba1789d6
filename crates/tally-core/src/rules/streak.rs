//! Daily streak continuity rule

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::entities::Streak;
use crate::value_objects::{FigureId, UserId};

/// How a qualifying activity affected the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOutcome {
    /// First activity ever
    Started,
    /// Activity on the day after the previous one
    Continued,
    /// Gap of at least one full day; back to 1
    Reset,
    /// Already counted today (or the stored date is ahead of `today`)
    Unchanged,
}

impl StreakOutcome {
    #[inline]
    pub fn gained(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Continued => "continued",
            Self::Reset => "reset",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Result of applying one activity on `today`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakTransition {
    pub outcome: StreakOutcome,
    pub streak: Streak,
}

impl StreakTransition {
    pub fn compute(
        existing: Option<Streak>,
        user_id: &UserId,
        figure_id: &FigureId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(mut streak) = existing else {
            return Self {
                outcome: StreakOutcome::Started,
                streak: Streak::start(user_id.clone(), figure_id.clone(), today, now),
            };
        };

        let yesterday = today.checked_sub_days(Days::new(1));
        let outcome = if streak.last_activity_date >= today {
            StreakOutcome::Unchanged
        } else if Some(streak.last_activity_date) == yesterday {
            StreakOutcome::Continued
        } else {
            StreakOutcome::Reset
        };

        match outcome {
            StreakOutcome::Unchanged => {}
            StreakOutcome::Continued => streak.current_streak += 1,
            StreakOutcome::Started | StreakOutcome::Reset => streak.current_streak = 1,
        }
        if outcome.gained() {
            streak.longest_streak = streak.longest_streak.max(streak.current_streak);
            streak.last_activity_date = today;
            streak.updated_at = now;
        }

        Self { outcome, streak }
    }

    #[inline]
    pub fn gained(&self) -> bool {
        self.outcome.gained()
    }

    #[inline]
    pub fn new_streak(&self) -> i64 {
        self.streak.current_streak
    }
}
