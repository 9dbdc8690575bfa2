//! Pool admission middleware for axum.
//!
//! Applies the `PoolDegradation` admission policy to HTTP requests:
//!
//! - Normal pool: requests pass straight through.
//! - Degraded pool: every request takes an admission slot for its whole
//!   lifetime; a full gate answers 503.
//! - Shedding pool: mutating requests (`POST`, `PUT`, `PATCH`, `DELETE`) are
//!   rejected with 503 before touching the database.
//!
//! Rejections carry a `Retry-After` header with the jittered hint.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post, middleware};
//!
//! let app = Router::new()
//!     .route("/api/deliberations", post(start_deliberation))
//!     .layer(middleware::from_fn_with_state(degradation, pool_admission_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::pool_degradation::{
    AdmissionRejection, PoolDegradation, PoolExhaustionError, RequestKind,
};

/// Pool admission middleware state.
pub type PoolAdmissionState = Arc<PoolDegradation>;

/// Gate requests on connection pool health.
pub async fn pool_admission_middleware(
    State(degradation): State<PoolAdmissionState>,
    request: Request,
    next: Next,
) -> Response {
    let kind = request_kind(request.method());

    let _slot = match degradation.admit(kind) {
        Ok(slot) => slot,
        Err(rejection) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %rejection,
                "Request rejected by pool admission"
            );
            return rejection.into_response();
        }
    };

    next.run(request).await
}

/// Classify a request by whether it writes.
pub fn request_kind(method: &Method) -> RequestKind {
    match *method {
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE => RequestKind::Mutating,
        _ => RequestKind::Read,
    }
}

/// Create a 503 Service Unavailable response.
fn unavailable_response(
    message: &str,
    code: &str,
    queue_depth: Option<usize>,
    retry_after_secs: u64,
) -> Response {
    let mut body = serde_json::json!({
        "error": message,
        "code": code,
        "retry_after_secs": retry_after_secs
    });
    if let Some(depth) = queue_depth {
        body["queue_depth"] = depth.into();
    }

    let mut response = (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

impl IntoResponse for PoolExhaustionError {
    fn into_response(self) -> Response {
        unavailable_response(
            "Database connection pool exhausted",
            "POOL_EXHAUSTED",
            Some(self.queue_depth),
            self.retry_after_secs,
        )
    }
}

impl IntoResponse for AdmissionRejection {
    fn into_response(self) -> Response {
        match self {
            AdmissionRejection::Shed { retry_after_secs } => unavailable_response(
                "Service is shedding write load",
                "LOAD_SHED",
                None,
                retry_after_secs,
            ),
            AdmissionRejection::Exhausted(err) => err.into_response(),
        }
    }
}
