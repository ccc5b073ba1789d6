//! Business logic services
//!
//! Every mutating operation is one [`TransactionBody`] executed by
//! [`run_transaction`], which retries the whole body on conflicts.

pub mod comment;
pub mod context;
pub mod error;
pub mod figure;
pub mod streak;
pub mod transaction;
pub mod vote;

// Re-export all services for convenience
pub use comment::CommentService;
pub use context::{EngineLimits, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use figure::FigureService;
pub use streak::StreakService;
pub use transaction::{run_transaction, RetryPolicy, TransactionBody};
pub use vote::VoteService;
