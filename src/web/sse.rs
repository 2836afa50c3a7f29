//! Server-Sent Events for real-time pose updates

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::rig::RigPose;
use crate::AppState;

/// Create an SSE stream that emits one event per animated rig pose
pub fn create_pose_stream(
    app_state: Arc<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app_state.subscribe_pose();

    // Convert broadcast receiver to a stream
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(pose) => {
            let event = pose_to_event(&pose);
            Some(Ok(event))
        }
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Convert a rig pose to an SSE event
fn pose_to_event(pose: &RigPose) -> Event {
    let data = serde_json::to_string(pose).unwrap_or_else(|_| "{}".to_string());

    Event::default().event("pose").data(data)
}
