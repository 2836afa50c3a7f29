//! REST API endpoints

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::expression::categories;
use crate::pipeline::ExpressionBuffer;
use crate::rig::RigPose;
use crate::web::sse;
use crate::AppState;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        })
    }

    pub fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub avatar: String,
    pub expression_held: bool,
    /// Averaged left/right eye blink from the held expression
    pub blink: f32,
    /// Jaw open score from the held expression
    pub jaw_open: f32,
    pub tick_hz: u32,
    pub version: String,
}

impl StatusResponse {
    /// Summarize the held expression buffer into status fields
    fn from_buffer(avatar: String, buffer: &ExpressionBuffer, tick_hz: u32) -> Self {
        Self {
            avatar,
            expression_held: !buffer.is_empty(),
            blink: categories::average_blink(buffer.snapshot()),
            jaw_open: categories::jaw_open(buffer.snapshot()),
            tick_hz,
            version: crate::VERSION.to_string(),
        }
    }
}

/// Get current status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let avatar = state.get_active_avatar().await;
    let buffer = state.get_buffer().await;
    let tick_hz = state.config.read().await.render.tick_hz;

    ApiResponse::success(StatusResponse::from_buffer(avatar, &buffer, tick_hz))
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read().await;
    Json(config.clone())
}

/// List configured avatars and which one is active
pub async fn list_avatars(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = state.get_active_avatar().await;
    let config = state.config.read().await;

    let mut avatars: Vec<String> = config.avatar.library.keys().cloned().collect();
    avatars.sort();

    ApiResponse::success(serde_json::json!({
        "active": active,
        "default": config.avatar.default,
        "avatars": avatars,
    }))
}

/// Avatar selection request
#[derive(Debug, Deserialize)]
pub struct SelectAvatarRequest {
    pub avatar: String,
}

/// Switch the animator to a different avatar from the library.
/// The held expression carries over to the new rig.
pub async fn select_avatar(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectAvatarRequest>,
) -> impl IntoResponse {
    let known = {
        let config = state.config.read().await;
        config.avatar.library.contains_key(&request.avatar)
    };

    if !known {
        return ApiResponse::error(&format!("Unknown avatar: {}", request.avatar));
    }

    tracing::info!("Switching avatar to '{}'", request.avatar);
    state.select_avatar(request.avatar).await;
    ApiResponse::<()>::ok()
}

/// Get the most recent animated pose
pub async fn get_pose(State(state): State<Arc<AppState>>) -> Json<ApiResponse<RigPose>> {
    match state.get_pose().await {
        Some(pose) => ApiResponse::success(pose),
        None => Json(ApiResponse {
            success: false,
            data: None,
            error: Some("No pose produced yet".to_string()),
        }),
    }
}

/// SSE stream endpoint
pub async fn pose_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    sse::create_pose_stream(state)
}
