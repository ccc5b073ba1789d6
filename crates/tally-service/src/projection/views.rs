//! Local projections built from the same rules the engine commits with

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use tally_core::{
    clamped_decrement, CounterTarget, Demographics, Figure, FigureId, Rating, RatingContribution,
    Streak, StreakTransition, UserId, VoteCategory, VoteTransition,
};

/// A target's counters for one vote kind plus the value the user holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteView<C: VoteCategory> {
    pub counts: BTreeMap<C, i64>,
    pub held: Option<C>,
}

impl<C: VoteCategory> VoteView<C> {
    /// Snapshot the counters of a stored target
    pub fn of<T: CounterTarget<C>>(target: &T, held: Option<C>) -> Self {
        Self {
            counts: C::ALL.iter().map(|c| (*c, target.count(*c))).collect(),
            held,
        }
    }

    /// Apply the toggle a cast of `value` will commit
    pub fn cast(&mut self, value: C) -> VoteTransition<C> {
        let transition = VoteTransition::compute(self.held, value);
        transition.apply_to(self);
        self.held = transition.current();
        transition
    }
}

impl<C: VoteCategory> CounterTarget<C> for VoteView<C> {
    fn count(&self, category: C) -> i64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    fn count_mut(&mut self, category: C) -> &mut i64 {
        self.counts.entry(category).or_insert(0)
    }
}

/// Figure aggregates after posting a comment with `rating`
pub fn project_comment(figure: &mut Figure, rating: Rating, demographics: Demographics) {
    figure.comment_count += 1;
    if let Some(contribution) = RatingContribution::of(rating, demographics) {
        contribution.add_to(figure);
    }
}

/// Figure aggregates after deleting a comment with `rating`
pub fn project_comment_removal(figure: &mut Figure, rating: Rating, demographics: Demographics) {
    figure.comment_count += clamped_decrement(figure.comment_count, 1);
    if let Some(contribution) = RatingContribution::of(rating, demographics) {
        contribution.remove_from(figure);
    }
}

/// Streak after a qualifying activity on `today`
pub fn project_activity(
    streak: &mut Option<Streak>,
    user_id: &UserId,
    figure_id: &FigureId,
    today: NaiveDate,
) -> bool {
    let transition = StreakTransition::compute(streak.take(), user_id, figure_id, today, Utc::now());
    let gained = transition.gained();
    *streak = Some(transition.streak);
    gained
}
