//! HTTP middleware for axum.
//!
//! - `pool_admission` - Connection pool backpressure for incoming requests

pub mod pool_admission;

pub use pool_admission::{pool_admission_middleware, request_kind, PoolAdmissionState};
