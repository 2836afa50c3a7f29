//! Tracking
//!
//! The camera-facing side of the pipeline: the frame feed, the detection
//! source abstraction, and the MediaPipe helper subprocess that does the
//! actual inference. Everything downstream of this module works purely in
//! expression scores and transforms.

pub mod remote;
pub mod subprocess;

use glam::Mat4;

use crate::error::Result;
use crate::expression::ExpressionSnapshot;

/// One video frame as the capture side reports it.
///
/// Frame identity is the source-reported media time. Wall-clock arrival
/// time plays no part in deduplication; a frame redelivered with the same
/// media time is the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoFrame {
    /// Media time of the frame, seconds
    pub current_time: f64,
}

impl VideoFrame {
    pub fn new(current_time: f64) -> Self {
        Self { current_time }
    }
}

/// Detector output for one processed frame
#[derive(Debug, Clone)]
pub struct Detection {
    /// Scored expression categories, in detector order
    pub categories: ExpressionSnapshot,
    /// Facial transformation matrix carrying the head pose
    pub transform: Mat4,
}

/// A face detector the frame gate can drive.
///
/// `Ok(None)` is a miss (no face in the frame), not an error; `Err` means
/// the source itself failed and the caller decides whether to retry.
pub trait DetectionSource {
    fn detect(&mut self, frame: &VideoFrame, timestamp_ms: i64) -> Result<Option<Detection>>;
}
