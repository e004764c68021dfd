//! HTTP surface: the liveness endpoint and the router that ties it to the WebSocket route.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::ws;

pub const LIVENESS_TEXT: &str = "Chat server running";

/// Liveness check.
///
/// GET /
pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Build the full application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
