//! Admission diagnostics endpoints.
//!
//! Read-only views of process-wide admission state plus a reset hook for
//! operators resuming a session from a checkpoint.

mod handlers;
mod routes;

pub use handlers::AdmissionAppState;
pub use routes::admission_routes;
