//! Value objects - immutable types that represent domain concepts

mod category;
mod ids;
mod rating;

pub use category::{
    ActivityKind, AttitudeCategory, CommentReaction, EmotionCategory, VoteCategory, VoteKind,
};
pub use ids::{CommentId, FigureId, IdParseError, ReplyId, UserId};
pub use rating::Rating;
