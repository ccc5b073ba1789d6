//! # tally-service
//!
//! Application layer: the transactional vote, comment, and streak engines,
//! request/response DTOs, and the optimistic client projection.

pub mod dto;
pub mod projection;
pub mod services;

pub use projection::{ProjectionError, ProjectionKey, ProjectionKind, ProjectionStore, Ticket};
pub use services::{
    run_transaction, CommentService, EngineLimits, FigureService, RetryPolicy, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, StreakService, TransactionBody,
    VoteService,
};
