//! Health / heartbeat endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Heartbeat endpoint.
///
/// Returns the server version, the configured transcoder and how many
/// transcoder slots are in use.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let capacity = state.admission.capacity();
    Json(json!({
        "status":     "ok",
        "version":    env!("CARGO_PKG_VERSION"),
        "transcoder": state.transcoder.describe(),
        "jobs": {
            "running":  capacity - state.admission.available(),
            "capacity": capacity,
        },
    }))
}
