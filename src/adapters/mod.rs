//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `clock` - System and manually driven clocks
//! - `postgres` - Pool probe and admission-gated checkout over sqlx
//! - `pool_monitor` - Background feed from the pool probe into degradation state
//! - `http` - axum middleware and diagnostics routes

pub mod clock;
pub mod http;
pub mod pool_monitor;
pub mod postgres;

pub use clock::{ManualClock, SystemClock};
pub use pool_monitor::PoolStateMonitor;
pub use postgres::{AcquireError, AdmittedPool, PgPoolProbe};
