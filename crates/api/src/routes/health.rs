//! Service endpoints: greeting, health, metrics

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::response::ApiResponse;
use crate::state::SharedState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

pub async fn root() -> &'static str {
    "ServiLog API is running"
}

/// Health check handler
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let database = match state.repo.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("Health check: database unavailable: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: if database == "ok" { "healthy" } else { "degraded" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
    })
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => ApiResponse::failure(StatusCode::NOT_FOUND, "Metrics are not enabled")
            .into_response(),
    }
}
