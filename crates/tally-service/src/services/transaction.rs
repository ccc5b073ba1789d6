//! Transaction runner with bounded optimistic retry
//!
//! A [`TransactionBody`] performs its reads, derives every write from what it
//! read, and buffers those writes on the transaction. The runner commits,
//! and when the store reports a conflict it re-runs the whole body on a fresh
//! transaction after an exponential, jittered backoff. Bodies never carry
//! state between attempts, so re-running them is always safe.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use tally_common::TransactionConfig;
use tally_core::{DocumentStore, Transaction};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Exponential backoff with optional ±30% jitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TransactionConfig::default())
    }
}

impl From<&TransactionConfig> for RetryPolicy {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately; for tests
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_backoff);
        if self.jitter && !base.is_zero() {
            let factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
            base.mul_f64(factor)
        } else {
            base
        }
    }
}

/// One atomic unit of work
#[async_trait]
pub trait TransactionBody: Send + Sync {
    type Output: Send;

    /// Read, then buffer writes. Must not keep state between calls.
    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<Self::Output>;
}

/// Execute `body` atomically, retrying conflicts per the context's policy
pub async fn run_transaction<B: TransactionBody>(
    ctx: &ServiceContext,
    operation: &'static str,
    body: &B,
) -> ServiceResult<B::Output> {
    let policy = ctx.retry_policy();
    let mut retry = 0;
    loop {
        match attempt(ctx.store(), body).await {
            Ok(output) => {
                if retry > 0 {
                    debug!(operation, retries = retry, "transaction committed after retry");
                }
                return Ok(output);
            }
            Err(e) if e.is_transient() => {
                if retry >= policy.max_retries {
                    warn!(operation, attempts = retry + 1, "transaction retries exhausted");
                    return Err(ServiceError::RetriesExhausted {
                        operation,
                        attempts: retry + 1,
                    });
                }
                let delay = policy.backoff(retry);
                warn!(
                    operation,
                    retry = retry + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "transaction conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn attempt<B: TransactionBody>(
    store: &dyn DocumentStore,
    body: &B,
) -> ServiceResult<B::Output> {
    let mut tx = store.begin().await?;
    match body.run(tx.as_mut()).await {
        Ok(output) => {
            tx.commit().await?;
            Ok(output)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}
