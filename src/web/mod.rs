//! HTTP interface
//!
//! JSON API for status, avatar selection, and the live pose stream.

pub mod api;
pub mod routes;
pub mod sse;

use axum::Router;
use std::sync::Arc;

use crate::config::HttpConfig;
use crate::AppState;

/// Web server for the JSON API and SSE pose stream
pub struct WebServer {
    app_state: Arc<AppState>,
    config: HttpConfig,
}

impl WebServer {
    /// Create a new web server
    pub fn new(app_state: Arc<AppState>, config: &HttpConfig) -> Self {
        Self {
            app_state,
            config: config.clone(),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.app_state), &self.config)
    }
}
