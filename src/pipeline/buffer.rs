//! Expression buffer
//!
//! The hand-off point between the tracking task and the render tick. The
//! tracking side writes a full `(snapshot, rotation)` pair per accepted
//! detection; the render side reads whatever pair is current. The pair is
//! always replaced together, so a reader can never observe a snapshot from
//! one cycle next to a rotation from another.

use crate::expression::{ExpressionScore, ExpressionSnapshot};
use crate::retarget::pose::RotationSample;

/// Latest detector output, held until the next non-empty detection.
///
/// Starts empty with a zero rotation. A detection miss writes nothing, so
/// the avatar keeps its last expression instead of snapping to neutral
/// when the face drops out for a frame.
#[derive(Debug, Clone, Default)]
pub struct ExpressionBuffer {
    snapshot: ExpressionSnapshot,
    rotation: RotationSample,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffered pair with one detection cycle's output
    pub fn update(&mut self, snapshot: ExpressionSnapshot, rotation: RotationSample) {
        self.snapshot = snapshot;
        self.rotation = rotation;
    }

    /// True until the first non-empty detection arrives
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn snapshot(&self) -> &[ExpressionScore] {
        &self.snapshot
    }

    pub fn rotation(&self) -> RotationSample {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionScore;

    #[test]
    fn test_starts_empty_with_zero_rotation() {
        let buffer = ExpressionBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.rotation(), RotationSample::ZERO);
    }

    #[test]
    fn test_update_replaces_the_whole_pair() {
        let mut buffer = ExpressionBuffer::new();
        buffer.update(
            vec![
                ExpressionScore::new("jawOpen", 0.5),
                ExpressionScore::new("eyeBlinkLeft", 0.2),
            ],
            RotationSample::new(0.1, 0.0, 0.0),
        );

        buffer.update(
            vec![ExpressionScore::new("mouthPucker", 0.9)],
            RotationSample::new(0.0, 0.2, 0.0),
        );

        // Replacement, not a merge: the first cycle's categories are gone
        assert_eq!(buffer.snapshot().len(), 1);
        assert_eq!(buffer.snapshot()[0].category, "mouthPucker");
        assert_eq!(buffer.rotation(), RotationSample::new(0.0, 0.2, 0.0));
    }

    #[test]
    fn test_snapshot_preserves_detector_order() {
        let mut buffer = ExpressionBuffer::new();
        buffer.update(
            vec![
                ExpressionScore::new("browDownLeft", 0.1),
                ExpressionScore::new("browDownRight", 0.2),
                ExpressionScore::new("jawOpen", 0.3),
            ],
            RotationSample::ZERO,
        );

        let categories: Vec<&str> = buffer
            .snapshot()
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(categories, ["browDownLeft", "browDownRight", "jawOpen"]);
    }
}
