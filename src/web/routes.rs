//! Route definitions for the HTTP interface

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::AppState;

use super::api;

/// Create the main router with all routes
pub fn create_router(app_state: Arc<AppState>, config: &HttpConfig) -> Router {
    let cors = if config.cors_enabled {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        // API endpoints (JSON)
        .route("/api/status", get(api::get_status))
        .route("/api/config", get(api::get_config))
        .route("/api/avatars", get(api::list_avatars))
        .route("/api/avatar", post(api::select_avatar))
        .route("/api/pose", get(api::get_pose))
        // SSE stream of animated poses
        .route("/api/pose/stream", get(api::pose_stream))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
