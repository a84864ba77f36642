//! System endpoints: health check and live connection overview.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving.
    pub status: String,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// Snapshot of the connection registry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionsResponse {
    /// Identifiers of the registered devices, sorted.
    pub devices: Vec<String>,
    /// Number of registered viewers.
    pub viewer_count: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /api/v1/connections` — Registered devices and viewer count.
#[utoipa::path(
    get,
    path = "/api/v1/connections",
    tag = "System",
    summary = "List live connections",
    description = "Returns the identifiers of all registered devices and the number of connected viewers. Unclassified connections are not counted.",
    responses(
        (status = 200, description = "Registry snapshot", body = ConnectionsResponse),
    )
)]
pub async fn connections_handler(State(state): State<AppState>) -> impl IntoResponse {
    let devices = state.registry.device_ids().await;
    let viewer_count = state.registry.viewer_count().await;
    (
        StatusCode::OK,
        Json(ConnectionsResponse {
            devices,
            viewer_count,
        }),
    )
}

/// Routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/connections", get(connections_handler))
}
