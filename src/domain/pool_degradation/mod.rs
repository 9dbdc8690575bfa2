//! Pool degradation - three-tier backpressure for the database pool.
//!
//! ## Tiers
//!
//! - **Normal**: utilization below the degradation threshold, no restriction
//! - **Degraded**: at or above the degradation threshold, reads pass through the admission gate
//! - **Shedding**: at or above the shed threshold, mutating requests are rejected
//!
//! ```text
//! pct < 90  --> Normal
//! pct >= 90 --> Degraded
//! pct >= 95 --> Shedding
//! ```
//!
//! The tier is a pure function of the latest reported utilization. There is
//! no hysteresis: every `update_pool_state` recomputes it from scratch.

mod config;
mod error;
mod manager;
mod tier;

pub use config::PoolDegradationConfig;
pub use error::{AdmissionRejection, PoolExhaustionError};
pub use manager::{AdmissionGuard, DegradationStats, PoolDegradation};
pub use tier::{DegradationTier, RequestKind};
