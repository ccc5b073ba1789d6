//! Exclusive-vote toggle transition

use super::clamped_decrement;
use crate::entities::{Comment, Figure, Reply};
use crate::value_objects::{AttitudeCategory, CommentReaction, EmotionCategory, VoteCategory};

/// What casting `value` does given the user's previous vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition<C> {
    /// No previous vote
    Cast(C),
    /// Previous vote moves to a different bucket
    Change { from: C, to: C },
    /// Same value cast again: the vote is withdrawn
    Retract(C),
}

impl<C: VoteCategory> VoteTransition<C> {
    pub fn compute(previous: Option<C>, value: C) -> Self {
        match previous {
            None => Self::Cast(value),
            Some(old) if old == value => Self::Retract(value),
            Some(old) => Self::Change {
                from: old,
                to: value,
            },
        }
    }

    /// Bucket losing one unit
    pub fn decrement(self) -> Option<C> {
        match self {
            Self::Cast(_) => None,
            Self::Change { from, .. } => Some(from),
            Self::Retract(value) => Some(value),
        }
    }

    /// Bucket gaining one unit
    pub fn increment(self) -> Option<C> {
        match self {
            Self::Cast(value) | Self::Change { to: value, .. } => Some(value),
            Self::Retract(_) => None,
        }
    }

    pub fn previous(self) -> Option<C> {
        match self {
            Self::Cast(_) => None,
            Self::Change { from, .. } => Some(from),
            Self::Retract(value) => Some(value),
        }
    }

    /// Value the user holds afterwards; `None` once retracted
    pub fn current(self) -> Option<C> {
        self.increment()
    }

    #[inline]
    pub fn is_retraction(self) -> bool {
        matches!(self, Self::Retract(_))
    }

    /// Apply the counter movement to a local copy, clamping at zero
    pub fn apply_to<T: CounterTarget<C>>(self, target: &mut T) {
        if let Some(old) = self.decrement() {
            let slot = target.count_mut(old);
            *slot += clamped_decrement(*slot, 1);
        }
        if let Some(new) = self.increment() {
            *target.count_mut(new) += 1;
        }
    }
}

/// A document holding one counter per category of `C`
pub trait CounterTarget<C: VoteCategory> {
    fn count(&self, category: C) -> i64;
    fn count_mut(&mut self, category: C) -> &mut i64;
}

impl CounterTarget<AttitudeCategory> for Figure {
    fn count(&self, category: AttitudeCategory) -> i64 {
        self.attitude(category)
    }

    fn count_mut(&mut self, category: AttitudeCategory) -> &mut i64 {
        self.attitude_counts
            .entry(category.as_str().to_string())
            .or_insert(0)
    }
}

impl CounterTarget<EmotionCategory> for Figure {
    fn count(&self, category: EmotionCategory) -> i64 {
        self.emotion(category)
    }

    fn count_mut(&mut self, category: EmotionCategory) -> &mut i64 {
        self.emotion_counts
            .entry(category.as_str().to_string())
            .or_insert(0)
    }
}

macro_rules! reaction_target {
    ($ty:ty) => {
        impl CounterTarget<CommentReaction> for $ty {
            fn count(&self, category: CommentReaction) -> i64 {
                match category {
                    CommentReaction::Like => self.likes,
                    CommentReaction::Dislike => self.dislikes,
                }
            }

            fn count_mut(&mut self, category: CommentReaction) -> &mut i64 {
                match category {
                    CommentReaction::Like => &mut self.likes,
                    CommentReaction::Dislike => &mut self.dislikes,
                }
            }
        }
    };
}

reaction_target!(Comment);
reaction_target!(Reply);

#[cfg(test)]
mod tests {
    use super::*;
    use AttitudeCategory::{Fan, Hater};

    #[test]
    fn test_compute() {
        assert_eq!(VoteTransition::compute(None, Fan), VoteTransition::Cast(Fan));
        assert_eq!(
            VoteTransition::compute(Some(Fan), Fan),
            VoteTransition::Retract(Fan)
        );
        assert_eq!(
            VoteTransition::compute(Some(Fan), Hater),
            VoteTransition::Change { from: Fan, to: Hater }
        );
    }

    #[test]
    fn test_fan_hater_hater_sequence() {
        let mut figure = Figure::new("Ada");
        let mut held = None;
        let mut snapshots = Vec::new();
        for value in [Fan, Hater, Hater] {
            let transition = VoteTransition::compute(held, value);
            transition.apply_to(&mut figure);
            held = transition.current();
            snapshots.push((figure.attitude(Fan), figure.attitude(Hater)));
        }
        assert_eq!(snapshots, vec![(1, 0), (0, 1), (0, 0)]);
        assert_eq!(held, None);
    }

    #[test]
    fn test_double_cast_restores_baseline() {
        let mut figure = Figure::new("Ada");
        *CounterTarget::<EmotionCategory>::count_mut(&mut figure, EmotionCategory::Joy) = 3;
        let first = VoteTransition::compute(None, EmotionCategory::Joy);
        first.apply_to(&mut figure);
        VoteTransition::compute(first.current(), EmotionCategory::Joy).apply_to(&mut figure);
        assert_eq!(figure.emotion(EmotionCategory::Joy), 3);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut figure = Figure::new("Ada");
        VoteTransition::Change { from: Fan, to: Hater }.apply_to(&mut figure);
        assert_eq!(figure.attitude(Fan), 0);
        assert_eq!(figure.attitude(Hater), 1);
    }

    #[test]
    fn test_user_contributes_at_most_one_unit() {
        let mut figure = Figure::new("Ada");
        let mut held = None;
        for value in [Fan, Hater, AttitudeCategory::Simp, AttitudeCategory::Simp, Fan] {
            let transition = VoteTransition::compute(held, value);
            transition.apply_to(&mut figure);
            held = transition.current();
            let total: i64 = AttitudeCategory::ALL
                .iter()
                .map(|c| CounterTarget::count(&figure, *c))
                .sum();
            assert_eq!(total, i64::from(held.is_some()));
        }
    }
}
