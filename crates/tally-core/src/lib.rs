//! # tally-core
//!
//! Domain layer containing entities, value objects, the document model, pure
//! transition rules, and the document store ports.
//! This crate has zero dependencies on infrastructure (database, runtime, etc.).

pub mod document;
pub mod entities;
pub mod error;
pub mod rules;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use document::{
    apply_writes, paths, CollectionPath, DocPath, Document, FieldPath, WriteBuffer, WriteOp,
};
pub use entities::{
    Comment, CommentAuthorMarker, CountryStat, Demographics, Figure, Identity, RatingBreakdown,
    Reply, Streak, UserProfile, VoteRecord,
};
pub use error::{DomainError, ErrorKind};
pub use rules::{
    clamped_decrement, CounterTarget, RatingContribution, StreakOutcome, StreakTransition,
    VoteTransition,
};
pub use traits::{get_typed, set_typed, DocumentStore, RepoResult, Transaction};
pub use value_objects::{
    ActivityKind, AttitudeCategory, CommentId, CommentReaction, EmotionCategory, FigureId,
    IdParseError, Rating, ReplyId, UserId, VoteCategory, VoteKind,
};
