//! Test helpers for integration tests
//!
//! Provides an engine harness over an injected store plus shortcuts for
//! reading back aggregates.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tally_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tally_core::{DocPath, Document, Figure, FigureId};
use tally_db::MemoryDocumentStore;
use tally_service::{
    CommentService, EngineLimits, FigureService, RetryPolicy, ServiceContext, StreakService,
    VoteService,
};

/// Engine under test
pub struct TestEngine {
    pub ctx: ServiceContext,
    memory: Option<MemoryDocumentStore>,
}

impl TestEngine {
    /// Engine on a fresh in-memory store with immediate retries
    pub fn memory() -> Self {
        Self::memory_with(RetryPolicy::immediate(5), EngineLimits::default())
    }

    pub fn memory_with(retry: RetryPolicy, limits: EngineLimits) -> Self {
        init_test_tracing();
        let store = MemoryDocumentStore::new();
        let ctx = ServiceContext::new(Arc::new(store.clone()), retry, limits);
        Self {
            ctx,
            memory: Some(store),
        }
    }

    /// Retry policy for tests that race many writers on one document
    pub fn contended_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 200,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(8),
            jitter: true,
        }
    }

    /// Engine on PostgreSQL, or `None` when DATABASE_URL is not set
    pub async fn postgres() -> Result<Option<Self>> {
        init_test_tracing();
        let config = AppConfig::from_env()?;
        if config.database.is_none() {
            eprintln!("Skipping test: DATABASE_URL not set");
            return Ok(None);
        }
        let ctx = ServiceContext::connect(&config).await?;
        Ok(Some(Self { ctx, memory: None }))
    }

    /// Backing memory store; panics on a PostgreSQL engine
    pub fn store(&self) -> &MemoryDocumentStore {
        self.memory.as_ref().expect("memory-backed engine")
    }

    pub fn votes(&self) -> VoteService<'_> {
        VoteService::new(&self.ctx)
    }

    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(&self.ctx)
    }

    pub fn streaks(&self) -> StreakService<'_> {
        StreakService::new(&self.ctx)
    }

    pub fn figures(&self) -> FigureService<'_> {
        FigureService::new(&self.ctx)
    }

    /// Register a fresh figure and return its id
    pub async fn seed_figure(&self, name: &str) -> FigureId {
        let id = crate::fixtures::unique_figure_id(name);
        self.figures()
            .register_figure(&id, name)
            .await
            .expect("register figure");
        id
    }

    pub async fn figure(&self, id: &FigureId) -> Figure {
        self.figures().get_figure(id).await.expect("read figure").figure
    }

    pub async fn doc(&self, path: &DocPath) -> Option<Document> {
        self.ctx.store().get(path).await.expect("read document")
    }
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(&TracingConfig::development());
}
