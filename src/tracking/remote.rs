//! Remote face tracker receiver
//!
//! Receives JSON-over-UDP packets from the `scripts/face_tracker.py`
//! helper. Each packet is one camera frame the helper ran the landmarker
//! on: the frame's media time, the scored blendshape categories, and the
//! facial transformation matrix. The receiver keeps only the newest
//! packet and re-presents its frame until a fresher one arrives, leaving
//! deduplication to the frame gate.

use serde::Deserialize;
use std::net::UdpSocket;
use std::time::Duration;

use glam::Mat4;

use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};
use crate::expression::ExpressionScore;
use crate::tracking::{Detection, DetectionSource, VideoFrame};

/// A single JSON packet from the tracker helper
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerPacket {
    /// Media time of the processed frame, seconds
    pub frame_time: f64,
    /// Whether a face was detected this frame
    pub face_detected: bool,
    /// Scored categories in detector order
    #[serde(default)]
    pub blendshapes: Vec<ExpressionScore>,
    /// Facial transformation matrix, 16 floats column-major
    #[serde(default)]
    pub transform: Option<[f32; 16]>,
}

/// JSON-over-UDP tracker receiver.
///
/// Doubles as the pipeline's frame feed (`poll_frame`) and its detection
/// source (`detect`), since the helper already ran inference by the time
/// a packet lands here.
pub struct RemoteTracker {
    config: TrackerConfig,
    socket: Option<UdpSocket>,
    latest: Option<TrackerPacket>,
}

impl RemoteTracker {
    /// Create a new receiver (does not bind yet)
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            config: config.clone(),
            socket: None,
            latest: None,
        }
    }

    /// Bind the UDP socket and start receiving
    pub fn start(&mut self) -> Result<()> {
        let addr = format!("{}:{}", self.config.listen_address, self.config.port);

        let socket = UdpSocket::bind(&addr).map_err(|e| {
            TrackingError::Unavailable(format!("Failed to bind to {}: {}", addr, e))
        })?;

        socket.set_nonblocking(true).map_err(|e| {
            TrackingError::Unavailable(format!("Failed to set non-blocking: {}", e))
        })?;

        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .ok();

        tracing::info!("Tracker receiver listening on {}", addr);
        self.socket = Some(socket);

        Ok(())
    }

    /// Pull at most one pending packet off the socket and return the
    /// current frame.
    ///
    /// The same frame is returned again when nothing new has arrived; the
    /// gate downstream decides whether it has been processed already.
    pub fn poll_frame(&mut self) -> Result<Option<VideoFrame>> {
        let socket = match &self.socket {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut buf = [0u8; 65536];

        match socket.recv(&mut buf) {
            Ok(size) if size > 0 => {
                let packet: TrackerPacket = serde_json::from_slice(&buf[..size])
                    .map_err(|e| TrackingError::Parse(format!("JSON parse error: {}", e)))?;
                self.latest = Some(packet);
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // No data available
            }
            Err(e) => {
                return Err(TrackingError::Receiver(format!("Receive error: {}", e)).into());
            }
        }

        Ok(self
            .latest
            .as_ref()
            .map(|p| VideoFrame::new(p.frame_time)))
    }

    /// Stop the receiver
    pub fn stop(&mut self) {
        self.socket = None;
        tracing::info!("Tracker receiver stopped");
    }
}

impl DetectionSource for RemoteTracker {
    /// Surface the buffered packet's detection for the gated frame.
    ///
    /// Inference already happened helper-side, so the timestamp is unused
    /// here; it stays in the signature for sources that detect in-process.
    fn detect(&mut self, _frame: &VideoFrame, _timestamp_ms: i64) -> Result<Option<Detection>> {
        let packet = match &self.latest {
            Some(p) => p,
            None => return Ok(None),
        };

        if !packet.face_detected || packet.blendshapes.is_empty() {
            return Ok(None);
        }

        let transform = match packet.transform {
            Some(cols) => Mat4::from_cols_array(&cols),
            None => return Ok(None),
        };

        Ok(Some(Detection {
            categories: packet.blendshapes.clone(),
            transform,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_COLS: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    fn tracker_with(latest: Option<TrackerPacket>) -> RemoteTracker {
        RemoteTracker {
            config: TrackerConfig::default(),
            socket: None,
            latest,
        }
    }

    fn face_packet(frame_time: f64) -> TrackerPacket {
        TrackerPacket {
            frame_time,
            face_detected: true,
            blendshapes: vec![
                ExpressionScore::new("browDownLeft", 0.1),
                ExpressionScore::new("jawOpen", 0.45),
            ],
            transform: Some(IDENTITY_COLS),
        }
    }

    #[test]
    fn test_parse_packet() {
        let json = serde_json::json!({
            "frame_time": 1.234,
            "face_detected": true,
            "blendshapes": [
                {"category": "_neutral", "score": 0.0},
                {"category": "browDownLeft", "score": 0.12},
                {"category": "jawOpen", "score": 0.45}
            ],
            "transform": [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                2.5, -1.0, -30.0, 1.0
            ]
        })
        .to_string();

        let pkt: TrackerPacket = serde_json::from_str(&json).unwrap();

        assert!(pkt.face_detected);
        assert!((pkt.frame_time - 1.234).abs() < 1e-9);
        assert_eq!(pkt.blendshapes.len(), 3);
        assert_eq!(pkt.blendshapes[1].category, "browDownLeft");
        assert!((pkt.blendshapes[2].score - 0.45).abs() < 1e-6);
        assert!((pkt.transform.unwrap()[12] - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_parse_no_face_packet() {
        let json = r#"{"frame_time":0.5,"face_detected":false}"#;
        let pkt: TrackerPacket = serde_json::from_str(json).unwrap();

        assert!(!pkt.face_detected);
        assert!(pkt.blendshapes.is_empty());
        assert!(pkt.transform.is_none());
    }

    #[test]
    fn test_detect_builds_detection_in_order() {
        let mut tracker = tracker_with(Some(face_packet(0.033)));

        let detection = tracker
            .detect(&VideoFrame::new(0.033), 0)
            .unwrap()
            .expect("face packet should detect");

        let categories: Vec<&str> = detection
            .categories
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(categories, ["browDownLeft", "jawOpen"]);
        assert_eq!(detection.transform, Mat4::IDENTITY);
    }

    #[test]
    fn test_detect_miss_when_no_face() {
        let mut packet = face_packet(0.1);
        packet.face_detected = false;
        let mut tracker = tracker_with(Some(packet));

        assert!(tracker.detect(&VideoFrame::new(0.1), 0).unwrap().is_none());
    }

    #[test]
    fn test_detect_miss_when_no_categories() {
        let mut packet = face_packet(0.1);
        packet.blendshapes.clear();
        let mut tracker = tracker_with(Some(packet));

        assert!(tracker.detect(&VideoFrame::new(0.1), 0).unwrap().is_none());
    }

    #[test]
    fn test_detect_miss_when_no_transform() {
        let mut packet = face_packet(0.1);
        packet.transform = None;
        let mut tracker = tracker_with(Some(packet));

        assert!(tracker.detect(&VideoFrame::new(0.1), 0).unwrap().is_none());
    }

    #[test]
    fn test_detect_before_any_packet() {
        let mut tracker = tracker_with(None);
        assert!(tracker.detect(&VideoFrame::new(0.0), 0).unwrap().is_none());
    }

    #[test]
    fn test_poll_frame_without_socket() {
        let mut tracker = tracker_with(Some(face_packet(2.0)));
        // Not started: no frames are reported even with a buffered packet
        assert!(tracker.poll_frame().unwrap().is_none());

        tracker.latest = None;
        assert!(tracker.poll_frame().unwrap().is_none());
    }
}
