//! HTTP routes for admission diagnostics.

use axum::routing::get;
use axum::Router;

use super::handlers::{health, pool_stats, reset_session, session_stats, AdmissionAppState};

/// Creates the diagnostics router with all routes.
pub fn admission_routes(state: AdmissionAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/internal/admission/pool", get(pool_stats))
        .route(
            "/internal/admission/sessions/:session_id",
            get(session_stats).delete(reset_session),
        )
        .with_state(state)
}
