//! Pure transition rules
//!
//! Both the transactional services and the optimistic client projection
//! derive their deltas from these functions, so a speculative update always
//! matches what the committed transaction applies.

mod rating;
mod streak;
mod vote;

pub use rating::{clamped_decrement, RatingContribution};
pub use streak::{StreakOutcome, StreakTransition};
pub use vote::{CounterTarget, VoteTransition};
