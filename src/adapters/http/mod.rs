//! HTTP adapters - axum middleware and diagnostics endpoints.

pub mod admission;
pub mod middleware;

pub use admission::{admission_routes, AdmissionAppState};
pub use middleware::{pool_admission_middleware, PoolAdmissionState};
