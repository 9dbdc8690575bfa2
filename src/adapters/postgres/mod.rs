//! PostgreSQL adapters.
//!
//! - `PgPoolProbe` - `PoolHealthProbe` over an `sqlx::PgPool`
//! - `AdmittedPool` - Connection checkout gated by `PoolDegradation`

mod admitted_pool;
mod pool_probe;

pub use admitted_pool::{AcquireError, AdmittedPool};
pub use pool_probe::PgPoolProbe;
