//! PoolHealthProbe port - Samples connection pool occupancy.
//!
//! A probe feeds `PoolDegradation::update_pool_state` on a fixed cadence
//! (see `adapters::pool_monitor`). The probe only reports counts; deciding
//! what those counts mean is the degradation manager's job.

use async_trait::async_trait;
use serde::Serialize;

/// Point-in-time occupancy of a connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    /// Connections currently checked out.
    pub used: u32,
    /// Connections available for checkout, including ones not yet opened.
    pub free: u32,
    /// Configured pool capacity.
    pub max: u32,
}

impl PoolSnapshot {
    /// Creates a snapshot from the three pool counts.
    pub fn new(used: u32, free: u32, max: u32) -> Self {
        Self { used, free, max }
    }
}

/// Errors that can occur while sampling a pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolProbeError {
    /// The pool has been closed and can no longer be sampled.
    #[error("connection pool is closed")]
    PoolClosed,

    /// The probe backend failed.
    #[error("pool probe failed: {0}")]
    Backend(String),
}

/// Port for sampling connection pool health.
#[async_trait]
pub trait PoolHealthProbe: Send + Sync {
    /// Returns the pool's current occupancy.
    async fn sample(&self) -> Result<PoolSnapshot, PoolProbeError>;
}
