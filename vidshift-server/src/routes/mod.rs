//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (body limit, CORS, per-request trace-ID injection)
//! - Health / heartbeat route
//! - The two conversion routes, `/upload` and `/process-video`
//! - Optional OpenAPI document (disable with `VIDSHIFT_ENABLE_DOCS=false`)
//! - Static files from the public directory for everything else

mod delivery;
pub mod doc;
mod health;
mod process;
mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(upload::router())
        .merge(process::router());

    if state.config.enable_docs {
        let api_doc = doc::get_docs();
        app = app.route("/api-docs/openapi.json", get(|| async move { Json(api_doc) }));
    }

    app.fallback_service(ServeDir::new(&state.config.public_dir))
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
                .layer(cors::cors_layer(&state)),
        )
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
