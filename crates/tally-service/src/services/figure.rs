//! Figure service
//!
//! Figure registration and the aggregate read used by figure pages.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use tally_core::{
    get_typed, paths, set_typed, DomainError, Figure, FigureId, Rating, RatingBreakdown,
    Transaction,
};

use crate::dto::FigureView;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::transaction::{run_transaction, TransactionBody};

/// Figure service
pub struct FigureService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FigureService<'a> {
    /// Create a new FigureService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a figure with zeroed counters; returns false if it already exists
    #[instrument(skip(self))]
    pub async fn register_figure(&self, figure_id: &FigureId, name: &str) -> ServiceResult<bool> {
        let body = RegisterFigure {
            figure_id: figure_id.clone(),
            name: name.to_string(),
        };
        let created = run_transaction(self.ctx, "register_figure", &body).await?;
        if created {
            info!(figure_id = %figure_id, "Figure registered");
        } else {
            debug!(figure_id = %figure_id, "Figure already registered");
        }
        Ok(created)
    }

    /// Figure aggregates with every per-star breakdown, read in one snapshot
    #[instrument(skip(self))]
    pub async fn get_figure(&self, figure_id: &FigureId) -> ServiceResult<FigureView> {
        let body = ReadFigure {
            figure_id: figure_id.clone(),
        };
        run_transaction(self.ctx, "get_figure", &body).await
    }
}

struct RegisterFigure {
    figure_id: FigureId,
    name: String,
}

#[async_trait]
impl TransactionBody for RegisterFigure {
    type Output = bool;

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<bool> {
        let path = paths::figure(&self.figure_id);
        if tx.get(&path).await?.is_some() {
            return Ok(false);
        }
        set_typed(tx, path, &Figure::new(self.name.clone()))?;
        Ok(true)
    }
}

struct ReadFigure {
    figure_id: FigureId,
}

#[async_trait]
impl TransactionBody for ReadFigure {
    type Output = FigureView;

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<FigureView> {
        let figure: Figure = get_typed(tx, &paths::figure(&self.figure_id))
            .await?
            .ok_or_else(|| DomainError::FigureNotFound(self.figure_id.clone()))?;

        let mut rating_stats = BTreeMap::new();
        for star in 0..=Rating::MAX_STARS {
            let path = paths::rating_stats(&self.figure_id, star);
            if let Some(stats) = get_typed::<RatingBreakdown>(tx, &path).await? {
                rating_stats.insert(star, stats);
            }
        }

        Ok(FigureView {
            id: self.figure_id.clone(),
            average_rating: figure.average_rating(),
            figure,
            rating_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tally_core::ErrorKind;
    use tally_db::MemoryDocumentStore;

    use crate::services::{EngineLimits, RetryPolicy};

    fn context() -> ServiceContext {
        ServiceContext::new(
            Arc::new(MemoryDocumentStore::new()),
            RetryPolicy::immediate(1),
            EngineLimits::default(),
        )
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let ctx = context();
        let service = FigureService::new(&ctx);
        let id = FigureId::parse("ada").unwrap();
        assert!(service.register_figure(&id, "Ada").await.unwrap());
        assert!(!service.register_figure(&id, "Someone else").await.unwrap());

        let view = service.get_figure(&id).await.unwrap();
        assert_eq!(view.figure.name, "Ada");
        assert_eq!(view.figure.rating_count, 0);
        assert_eq!(view.average_rating, None);
        assert!(view.rating_stats.is_empty());
    }

    #[tokio::test]
    async fn test_missing_figure() {
        let ctx = context();
        let err = FigureService::new(&ctx)
            .get_figure(&FigureId::parse("nobody").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
