//! Domain entities - the stored records of the engagement engine
//!
//! Every entity serializes to a camelCase JSON document.

mod comment;
mod figure;
mod profile;
mod streak;
mod vote;

pub use comment::{Comment, CommentAuthorMarker, Reply};
pub use figure::{CountryStat, Figure, RatingBreakdown};
pub use profile::{Demographics, Identity, UserProfile};
pub use streak::Streak;
pub use vote::VoteRecord;
