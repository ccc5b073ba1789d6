//! Optimistic client projection
//!
//! A caller applies the delta it expects a transaction to make to a local
//! view before submitting. The view is then either confirmed or rolled back
//! to the last confirmed snapshot.

mod store;
mod views;

pub use store::{ProjectionError, ProjectionKey, ProjectionKind, ProjectionStore, Ticket};
pub use views::{project_activity, project_comment, project_comment_removal, VoteView};
