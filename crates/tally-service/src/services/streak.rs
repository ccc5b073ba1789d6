//! Streak service
//!
//! Daily activity streaks per (user, figure). The private record lives under
//! the user; a public mirror under the figure feeds leaderboards.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use tally_core::document::decode;
use tally_core::{
    get_typed, paths, set_typed, ActivityKind, DomainError, FigureId, Streak, StreakTransition,
    Transaction, UserId,
};

use crate::dto::{LeaderboardEntry, RecordActivityResponse, StreakView};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::transaction::{run_transaction, TransactionBody};

/// Streak service
pub struct StreakService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StreakService<'a> {
    /// Create a new StreakService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Count a qualifying activity on `today` (the caller's calendar day)
    #[instrument(skip(self))]
    pub async fn record_activity(
        &self,
        user_id: &UserId,
        figure_id: &FigureId,
        kind: ActivityKind,
        today: NaiveDate,
    ) -> ServiceResult<RecordActivityResponse> {
        let body = RecordActivity {
            user_id: user_id.clone(),
            figure_id: figure_id.clone(),
            today,
        };
        let transition = run_transaction(self.ctx, "record_activity", &body).await?;

        if transition.gained() {
            info!(
                figure_id = %figure_id,
                activity = %kind,
                outcome = transition.outcome.as_str(),
                streak = transition.new_streak(),
                "Streak updated"
            );
        } else {
            debug!(figure_id = %figure_id, activity = %kind, "Activity already counted today");
        }
        Ok(RecordActivityResponse {
            streak_gained: transition.gained(),
            new_streak: transition.new_streak(),
        })
    }

    /// The user's streak as displayed on `today`
    #[instrument(skip(self))]
    pub async fn get_streak(
        &self,
        user_id: &UserId,
        figure_id: &FigureId,
        today: NaiveDate,
    ) -> ServiceResult<StreakView> {
        let path = paths::user_streak(user_id, figure_id);
        let doc = self
            .ctx
            .store()
            .get(&path)
            .await?
            .ok_or(DomainError::StreakNotFound)?;
        let streak: Streak = decode(&path, doc)?;
        Ok(StreakView::on(&streak, today))
    }

    /// Active streaks on a figure, longest first, ties by user id
    ///
    /// Pages through every public mirror on the figure, keeping at most
    /// `limit` leaders between pages.
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        figure_id: &FigureId,
        today: NaiveDate,
        limit: usize,
    ) -> ServiceResult<Vec<LeaderboardEntry>> {
        let page_size = self.ctx.limits().leaderboard_page_size;
        let collection = paths::figure_streaks(figure_id);
        let mut cursor = None;
        let mut scanned = 0;
        let mut leaders: Vec<Streak> = Vec::new();

        loop {
            let page = self
                .ctx
                .store()
                .list_after(&collection, cursor.as_ref(), Some(page_size))
                .await?;
            let full = page.len() == page_size;
            scanned += page.len();

            for (path, doc) in page {
                let streak: Streak = decode(&path, doc)?;
                if streak.is_active_on(today) {
                    leaders.push(streak);
                }
                cursor = Some(path);
            }
            rank(&mut leaders, limit);

            if !full {
                break;
            }
        }

        debug!(scanned, returned = leaders.len(), "Leaderboard read");
        Ok(leaders.into_iter().map(LeaderboardEntry::from).collect())
    }
}

fn rank(streaks: &mut Vec<Streak>, limit: usize) {
    streaks.sort_by(|a, b| {
        (Reverse(a.current_streak), &a.user_id).cmp(&(Reverse(b.current_streak), &b.user_id))
    });
    streaks.truncate(limit);
}

struct RecordActivity {
    user_id: UserId,
    figure_id: FigureId,
    today: NaiveDate,
}

#[async_trait]
impl TransactionBody for RecordActivity {
    type Output = StreakTransition;

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<StreakTransition> {
        if tx.get(&paths::figure(&self.figure_id)).await?.is_none() {
            return Err(DomainError::FigureNotFound(self.figure_id.clone()).into());
        }
        let private = paths::user_streak(&self.user_id, &self.figure_id);
        let existing: Option<Streak> = get_typed(tx, &private).await?;

        let transition = StreakTransition::compute(
            existing,
            &self.user_id,
            &self.figure_id,
            self.today,
            Utc::now(),
        );
        if transition.gained() {
            set_typed(tx, private, &transition.streak)?;
            set_typed(
                tx,
                paths::public_streak(&self.figure_id, &self.user_id),
                &transition.streak,
            )?;
        }
        Ok(transition)
    }
}
