//! Pool health probe for sqlx PostgreSQL pools.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::ports::{PoolHealthProbe, PoolProbeError, PoolSnapshot};

/// Reads occupancy straight from the pool's own bookkeeping.
///
/// `used` is open connections minus idle ones; `free` is the remaining
/// capacity, counting connections the pool has not opened yet.
#[derive(Debug, Clone)]
pub struct PgPoolProbe {
    pool: PgPool,
}

impl PgPoolProbe {
    /// Create a probe for `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolHealthProbe for PgPoolProbe {
    async fn sample(&self) -> Result<PoolSnapshot, PoolProbeError> {
        if self.pool.is_closed() {
            return Err(PoolProbeError::PoolClosed);
        }

        let max = self.pool.options().get_max_connections();
        let open = self.pool.size();
        let idle = u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX);
        let used = open.saturating_sub(idle);
        let free = max.saturating_sub(used);

        Ok(PoolSnapshot::new(used, free, max))
    }
}
