//! HTTP handlers for admission diagnostics.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::AdmissionServices;
use crate::domain::pool_degradation::{DegradationStats, DegradationTier};
use crate::domain::rate_admission::SessionRateStats;

/// Shared state for the diagnostics router.
#[derive(Clone)]
pub struct AdmissionAppState {
    pub services: Arc<AdmissionServices>,
}

impl AdmissionAppState {
    pub fn new(services: Arc<AdmissionServices>) -> Self {
        Self { services }
    }
}

/// Liveness body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pool_tier: DegradationTier,
    pub tracked_sessions: usize,
}

/// Error body for diagnostics lookups.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Diagnostics API error.
pub enum AdmissionApiError {
    SessionNotFound(String),
}

impl IntoResponse for AdmissionApiError {
    fn into_response(self) -> Response {
        match self {
            AdmissionApiError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Session {} is not tracked", id),
                    code: "SESSION_NOT_FOUND",
                }),
            )
                .into_response(),
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AdmissionAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        pool_tier: state.services.pool_degradation.tier(),
        tracked_sessions: state.services.rate_admission.tracked_sessions(),
    })
}

/// GET /internal/admission/pool
pub async fn pool_stats(State(state): State<AdmissionAppState>) -> Json<DegradationStats> {
    Json(state.services.pool_degradation.stats())
}

/// GET /internal/admission/sessions/:session_id
pub async fn session_stats(
    State(state): State<AdmissionAppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionRateStats>, AdmissionApiError> {
    state
        .services
        .rate_admission
        .stats(&session_id)
        .map(Json)
        .ok_or(AdmissionApiError::SessionNotFound(session_id))
}

/// DELETE /internal/admission/sessions/:session_id
pub async fn reset_session(
    State(state): State<AdmissionAppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AdmissionApiError> {
    if state.services.rate_admission.reset(&session_id) {
        tracing::info!(session_id = %session_id, "Session rate state reset via diagnostics");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdmissionApiError::SessionNotFound(session_id))
    }
}
