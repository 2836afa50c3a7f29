//! Expression taxonomy
//!
//! Detector-side expression scores and the ARKit-style category names the
//! face landmarker emits. Category names are the join key between detector
//! output and avatar morph targets; they are matched verbatim, never
//! translated.

use serde::{Deserialize, Serialize};

/// A single scored expression category from one detection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionScore {
    /// ARKit-style category name, e.g. `"jawOpen"`
    pub category: String,
    /// Activation in `[0, 1]`
    pub score: f32,
}

impl ExpressionScore {
    pub fn new(category: impl Into<String>, score: f32) -> Self {
        Self {
            category: category.into(),
            score,
        }
    }
}

/// Ordered scores from one detection cycle; empty when no face was seen
pub type ExpressionSnapshot = Vec<ExpressionScore>;

/// Look up a category's score in a snapshot
pub fn score_of(snapshot: &[ExpressionScore], category: &str) -> Option<f32> {
    snapshot
        .iter()
        .find(|s| s.category == category)
        .map(|s| s.score)
}

/// ARKit-style blendshape category names emitted by the face landmarker
pub mod categories {
    use super::{score_of, ExpressionScore};

    pub const BROW_DOWN_LEFT: &str = "browDownLeft";
    pub const BROW_DOWN_RIGHT: &str = "browDownRight";
    pub const BROW_INNER_UP: &str = "browInnerUp";
    pub const BROW_OUTER_UP_LEFT: &str = "browOuterUpLeft";
    pub const BROW_OUTER_UP_RIGHT: &str = "browOuterUpRight";

    pub const EYE_BLINK_LEFT: &str = "eyeBlinkLeft";
    pub const EYE_BLINK_RIGHT: &str = "eyeBlinkRight";
    pub const EYE_LOOK_DOWN_LEFT: &str = "eyeLookDownLeft";
    pub const EYE_LOOK_DOWN_RIGHT: &str = "eyeLookDownRight";
    pub const EYE_LOOK_IN_LEFT: &str = "eyeLookInLeft";
    pub const EYE_LOOK_IN_RIGHT: &str = "eyeLookInRight";
    pub const EYE_LOOK_OUT_LEFT: &str = "eyeLookOutLeft";
    pub const EYE_LOOK_OUT_RIGHT: &str = "eyeLookOutRight";
    pub const EYE_LOOK_UP_LEFT: &str = "eyeLookUpLeft";
    pub const EYE_LOOK_UP_RIGHT: &str = "eyeLookUpRight";
    pub const EYE_SQUINT_LEFT: &str = "eyeSquintLeft";
    pub const EYE_SQUINT_RIGHT: &str = "eyeSquintRight";
    pub const EYE_WIDE_LEFT: &str = "eyeWideLeft";
    pub const EYE_WIDE_RIGHT: &str = "eyeWideRight";

    pub const JAW_FORWARD: &str = "jawForward";
    pub const JAW_LEFT: &str = "jawLeft";
    pub const JAW_OPEN: &str = "jawOpen";
    pub const JAW_RIGHT: &str = "jawRight";

    pub const MOUTH_CLOSE: &str = "mouthClose";
    pub const MOUTH_FROWN_LEFT: &str = "mouthFrownLeft";
    pub const MOUTH_FROWN_RIGHT: &str = "mouthFrownRight";
    pub const MOUTH_FUNNEL: &str = "mouthFunnel";
    pub const MOUTH_PUCKER: &str = "mouthPucker";
    pub const MOUTH_SMILE_LEFT: &str = "mouthSmileLeft";
    pub const MOUTH_SMILE_RIGHT: &str = "mouthSmileRight";

    pub const CHEEK_PUFF: &str = "cheekPuff";
    pub const CHEEK_SQUINT_LEFT: &str = "cheekSquintLeft";
    pub const CHEEK_SQUINT_RIGHT: &str = "cheekSquintRight";

    pub const NOSE_SNEER_LEFT: &str = "noseSneerLeft";
    pub const NOSE_SNEER_RIGHT: &str = "noseSneerRight";

    pub const TONGUE_OUT: &str = "tongueOut";

    /// Get average blink value from left and right eyes
    pub fn average_blink(snapshot: &[ExpressionScore]) -> f32 {
        let left = score_of(snapshot, EYE_BLINK_LEFT).unwrap_or(0.0);
        let right = score_of(snapshot, EYE_BLINK_RIGHT).unwrap_or(0.0);
        (left + right) / 2.0
    }

    /// Get mouth open value
    pub fn jaw_open(snapshot: &[ExpressionScore]) -> f32 {
        score_of(snapshot, JAW_OPEN).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_lookup() {
        let snapshot = vec![
            ExpressionScore::new(categories::JAW_OPEN, 0.7),
            ExpressionScore::new(categories::EYE_BLINK_LEFT, 0.2),
        ];

        assert_eq!(score_of(&snapshot, "jawOpen"), Some(0.7));
        assert_eq!(score_of(&snapshot, "eyeBlinkLeft"), Some(0.2));
        assert_eq!(score_of(&snapshot, "mouthPucker"), None);
    }

    #[test]
    fn test_average_blink() {
        let snapshot = vec![
            ExpressionScore::new(categories::EYE_BLINK_LEFT, 0.4),
            ExpressionScore::new(categories::EYE_BLINK_RIGHT, 0.8),
        ];

        assert!((categories::average_blink(&snapshot) - 0.6).abs() < 1e-6);
        assert_eq!(categories::average_blink(&[]), 0.0);
    }

    #[test]
    fn test_score_serde_roundtrip() {
        let score = ExpressionScore::new("mouthSmileLeft", 0.35);
        let json = serde_json::to_string(&score).unwrap();
        let back: ExpressionScore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, score);
    }
}
