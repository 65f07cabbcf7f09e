//! HTTP Routes
//!
//! Maps axum requests onto the term handler and its proxy-shaped responses
//! back onto HTTP.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use term_query_handlers::{FilterParams, TermGetHandler, TermGetRequest, TermGetResponse};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Term query handler
    pub term_handler: Arc<TermGetHandler>,
}

impl AppState {
    pub fn new(term_handler: TermGetHandler) -> Self {
        Self {
            term_handler: Arc::new(term_handler),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Term endpoints
        .route("/api/v1/terms", get(list_terms))
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Endpoints
// =============================================================================

/// Liveness probe - always returns OK if the process is running.
async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub schema_fields: usize,
}

/// Readiness probe - ready once a non-empty schema is loaded.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let schema_fields = state.term_handler.schema().len();

    let (status, label) = if schema_fields > 0 {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT_READY")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label.to_string(),
            schema_fields,
        }),
    )
}

// =============================================================================
// Term Endpoints
// =============================================================================

/// GET /api/v1/terms - Filtered term lookup.
async fn list_terms(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params: FilterParams = pairs.into_iter().collect();
    let response = state.term_handler.handle(TermGetRequest::new(params)).await;

    into_http_response(response)
}

/// Convert a handler response into an HTTP response.
pub fn into_http_response(response: TermGetResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut http = (status, Body::from(response.body)).into_response();

    for (name, value) in response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }

    http
}
