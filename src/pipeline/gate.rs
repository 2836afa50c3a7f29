//! Frame gate
//!
//! The consumer loop runs faster than the camera delivers frames, so the
//! same frame is handed over many times. The gate compares the frame's
//! media time against the last processed one and runs the detector only
//! when the time changes.

use crate::error::Result;
use crate::tracking::{Detection, DetectionSource, VideoFrame};

/// Once-per-distinct-frame detection guard.
///
/// The frame's time is recorded before the detector runs. A detector
/// failure therefore consumes the frame: the error reaches this tick's
/// caller, and the same frame is not retried next tick.
#[derive(Debug, Default)]
pub struct FrameGate {
    last_time: Option<f64>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame hand-off.
    ///
    /// Returns the accepted detection when the frame is new and the
    /// detector produced a non-empty result; `Ok(None)` for a repeated
    /// frame or a detection miss.
    pub fn process<S: DetectionSource>(
        &mut self,
        source: &mut S,
        frame: &VideoFrame,
        timestamp_ms: i64,
    ) -> Result<Option<Detection>> {
        if self.last_time == Some(frame.current_time) {
            return Ok(None);
        }
        self.last_time = Some(frame.current_time);

        let detection = source.detect(frame, timestamp_ms)?;

        // No categories means no usable detection, same as no face at all
        Ok(detection.filter(|d| !d.categories.is_empty()))
    }
}
