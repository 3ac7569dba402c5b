// =============================================================================
// HTTP Endpoints — Axum 0.7
// =============================================================================
//
// `/` serves the rendered stock table.  JSON views live under `/api/v1/`.
// Everything is read-only; until the first run has been published the
// content endpoints answer 503.
//
// CORS is configured permissively; the service exposes no write operations.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;

const NOT_READY: &str = "Stock data is not available yet. The first run is still in progress.";

// =============================================================================
// Router construction
// =============================================================================

/// Build the router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/records", get(records))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Stock table page
// =============================================================================

async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.latest() {
        Some(published) => Html(published.page_html.clone()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response(),
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    last_run_at: Option<DateTime<Utc>>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: Utc::now().timestamp_millis(),
        last_run_at: state.latest().map(|p| p.report.finished_at),
    };
    Json(resp)
}

// =============================================================================
// Latest run report
// =============================================================================

async fn records(State(state): State<Arc<AppState>>) -> Response {
    match state.latest() {
        Some(published) => Json(&published.report).into_response(),
        None => {
            let body = serde_json::json!({ "error": NOT_READY });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
