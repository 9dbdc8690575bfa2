//! Connection checkout gated by the degradation tier.
//!
//! Shedding rejects mutating work before it touches the pool. While degraded,
//! the checkout runs inside an admission gate slot, so at most
//! `queue_max_size` callers stack up behind the pool's own acquire timeout.

use std::sync::Arc;

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use thiserror::Error;

use crate::domain::pool_degradation::{AdmissionRejection, PoolDegradation, RequestKind};

/// Errors from a gated connection checkout.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The degradation tier refused the work.
    #[error(transparent)]
    Rejected(#[from] AdmissionRejection),

    /// Admitted, but the pool's checkout timed out.
    #[error("timed out waiting for a pooled connection; retry after {retry_after_secs}s")]
    QueueTimeout { retry_after_secs: u64 },

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AcquireError {
    /// Retry hint, when the failure is a capacity problem.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AcquireError::Rejected(rejection) => Some(rejection.retry_after_secs()),
            AcquireError::QueueTimeout { retry_after_secs } => Some(*retry_after_secs),
            AcquireError::Database(_) => None,
        }
    }
}

/// A `PgPool` that consults `PoolDegradation` before every checkout.
#[derive(Debug, Clone)]
pub struct AdmittedPool {
    pool: PgPool,
    degradation: Arc<PoolDegradation>,
}

impl AdmittedPool {
    /// Wrap `pool` with the given degradation manager.
    pub fn new(pool: PgPool, degradation: Arc<PoolDegradation>) -> Self {
        Self { pool, degradation }
    }

    /// Check out a connection for work of the given kind.
    pub async fn acquire(&self, kind: RequestKind) -> Result<PoolConnection<Postgres>, AcquireError> {
        let _slot = self.degradation.admit(kind)?;

        match self.pool.acquire().await {
            Ok(connection) => Ok(connection),
            Err(sqlx::Error::PoolTimedOut) => {
                self.degradation.record_queue_timeout();
                let retry_after_secs = self.degradation.retry_after();
                tracing::warn!(?kind, retry_after_secs, "Pool checkout timed out");
                Err(AcquireError::QueueTimeout { retry_after_secs })
            }
            Err(e) => Err(AcquireError::Database(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::SystemClock;
    use crate::domain::pool_degradation::PoolDegradationConfig;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy("postgres://admission@localhost/unused")
            .unwrap()
    }

    #[tokio::test]
    async fn shedding_rejects_writes_before_checkout() {
        let degradation = Arc::new(PoolDegradation::new(
            PoolDegradationConfig::default(),
            SystemClock::shared(),
        ));
        degradation.update_pool_state(20, 0, 20);
        let pool = AdmittedPool::new(lazy_pool(), degradation.clone());

        let err = pool.acquire(RequestKind::Mutating).await.unwrap_err();
        assert!(matches!(
            err,
            AcquireError::Rejected(AdmissionRejection::Shed { .. })
        ));
        assert!(err.retry_after_secs().is_some());
        assert_eq!(degradation.stats().requests_shed_total, 1);
    }

    #[tokio::test]
    async fn full_gate_rejects_reads_while_degraded() {
        let config = PoolDegradationConfig {
            queue_max_size: 1,
            ..Default::default()
        };
        let degradation = Arc::new(PoolDegradation::new(config, SystemClock::shared()));
        degradation.update_pool_state(18, 2, 20);
        let _held = degradation.scoped_admission().unwrap();
        let pool = AdmittedPool::new(lazy_pool(), degradation.clone());

        let err = pool.acquire(RequestKind::Read).await.unwrap_err();
        assert!(matches!(
            err,
            AcquireError::Rejected(AdmissionRejection::Exhausted(_))
        ));
        assert_eq!(degradation.stats().queue_depth, 1);
    }

    #[test]
    fn database_errors_carry_no_retry_hint() {
        let err = AcquireError::Database(sqlx::Error::PoolClosed);
        assert!(err.retry_after_secs().is_none());
    }
}
