//! Service context - dependency container for services
//!
//! Holds the injected document store and the engine's tuning knobs. There
//! are no global store handles; every service borrows the context.

use std::sync::Arc;

use tracing::info;

use tally_common::{AppConfig, AppError, EngineConfig};
use tally_core::DocumentStore;
use tally_db::{create_pool, ensure_schema, MemoryDocumentStore, PgDocumentStore, PoolConfig};

use super::error::{ServiceError, ServiceResult};
use super::transaction::RetryPolicy;

/// Limits on work done inside a single transaction or read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Owned children deleted inside the comment-delete transaction
    pub max_cascade_children: usize,
    /// Public streak documents fetched per leaderboard page
    pub leaderboard_page_size: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_cascade_children: config.max_cascade_children.max(1),
            leaderboard_page_size: config.leaderboard_page_size.max(1),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn DocumentStore>,
    retry: RetryPolicy,
    limits: EngineLimits,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(store: Arc<dyn DocumentStore>, retry: RetryPolicy, limits: EngineLimits) -> Self {
        Self {
            store,
            retry,
            limits,
        }
    }

    /// Build a context from configuration: PostgreSQL when a database is
    /// configured, the in-memory store otherwise
    pub async fn connect(config: &AppConfig) -> ServiceResult<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database {
            Some(database) => {
                let pool = create_pool(&PoolConfig::from(database))
                    .await
                    .map_err(AppError::internal)?;
                ensure_schema(&pool).await.map_err(AppError::internal)?;
                info!(
                    max_connections = database.max_connections,
                    "Using PostgreSQL document store"
                );
                Arc::new(PgDocumentStore::new(pool))
            }
            None => {
                info!("Using in-memory document store");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::new(
            store,
            RetryPolicy::from(&config.transaction),
            EngineLimits::from(&config.engine),
        ))
    }

    /// Get the document store
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the transaction retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Get the engine limits
    pub fn limits(&self) -> EngineLimits {
        self.limits
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn DocumentStore")
            .field("retry", &self.retry)
            .field("limits", &self.limits)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    retry: Option<RetryPolicy>,
    limits: Option<EngineLimits>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn limits(mut self, limits: EngineLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store
                .ok_or_else(|| ServiceError::validation("store is required"))?,
            self.retry.unwrap_or_default(),
            self.limits.unwrap_or_default(),
        ))
    }
}
