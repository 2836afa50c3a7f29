//! Retargeting
//!
//! Translates buffered detector output onto the avatar rig: morph weights
//! from expression scores, damped joint rotations from the head pose.

pub mod morph;
pub mod pose;

use crate::pipeline::ExpressionBuffer;
use crate::rig::AvatarRig;

/// Apply the buffered detection to the rig. Called once per render tick.
///
/// An empty buffer means nothing has been detected since startup; the rig
/// is left exactly as the previous tick wrote it. Otherwise morph weights
/// are written first, then the damped pose. Infallible by construction so
/// a bad frame can never take the tick loop down.
pub fn animate(buffer: &ExpressionBuffer, rig: &mut AvatarRig) {
    if buffer.is_empty() {
        return;
    }

    morph::apply_expressions(buffer.snapshot(), &mut rig.meshes);

    let damped = pose::distribute(buffer.rotation());
    rig.joints.head.rotation = damped.head.to_array();
    rig.joints.neck.rotation = damped.neck.to_array();
    rig.joints.spine.rotation = damped.spine.to_array();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionScore;
    use crate::retarget::pose::RotationSample;
    use crate::rig::{JointChain, MorphMesh};

    const EPS: f32 = 1e-6;

    fn test_rig() -> AvatarRig {
        AvatarRig::new(
            "man",
            vec![
                MorphMesh::new(
                    "Wolf3D_Head",
                    &["eyeBlinkLeft".to_string(), "jawOpen".to_string()],
                ),
                MorphMesh::new("Wolf3D_Teeth", &["jawOpen".to_string()]),
            ],
            JointChain::default(),
        )
    }

    fn assert_rotation(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < EPS, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn test_empty_buffer_leaves_rig_untouched() {
        let mut rig = test_rig();
        rig.meshes[0].set_influence(1, 0.6);
        rig.joints.head.rotation = [0.1, 0.2, 0.3];

        animate(&ExpressionBuffer::new(), &mut rig);

        assert_eq!(rig.meshes[0].influences(), &[0.0, 0.6]);
        assert_rotation(rig.joints.head.rotation, [0.1, 0.2, 0.3]);
        // Even the neck pitch bias must not appear without a detection
        assert_rotation(rig.joints.neck.rotation, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_animate_writes_morphs_and_damped_pose() {
        let mut rig = test_rig();
        let mut buffer = ExpressionBuffer::new();
        buffer.update(
            vec![ExpressionScore::new("jawOpen", 0.8)],
            RotationSample::new(0.3, 0.6, 0.9),
        );

        animate(&buffer, &mut rig);

        assert_eq!(rig.meshes[0].influences(), &[0.0, 0.8]);
        assert_eq!(rig.meshes[1].influences(), &[0.8]);
        assert_rotation(rig.joints.head.rotation, [0.1, 0.2, 0.3]);
        assert_rotation(rig.joints.neck.rotation, [0.36, 0.12, 0.18]);
        assert_rotation(rig.joints.spine.rotation, [0.03, 0.06, 0.09]);
    }

    #[test]
    fn test_animate_is_idempotent_for_a_held_buffer() {
        let mut rig = test_rig();
        let mut buffer = ExpressionBuffer::new();
        buffer.update(
            vec![ExpressionScore::new("eyeBlinkLeft", 0.4)],
            RotationSample::new(0.5, 0.0, 0.0),
        );

        animate(&buffer, &mut rig);
        let first = rig.pose();

        // A detection miss leaves the buffer as-is; further ticks re-apply
        // the same state without drift
        animate(&buffer, &mut rig);
        animate(&buffer, &mut rig);

        assert_eq!(rig.pose(), first);
    }

    #[test]
    fn test_new_rig_picks_up_held_expression() {
        let mut buffer = ExpressionBuffer::new();
        buffer.update(
            vec![ExpressionScore::new("jawOpen", 0.7)],
            RotationSample::ZERO,
        );

        let mut rig = test_rig();
        animate(&buffer, &mut rig);

        // Swap for a fresh rig, keeping the buffer: the replacement avatar
        // wears the held expression on its first tick
        let mut replacement = test_rig();
        animate(&buffer, &mut replacement);

        assert_eq!(replacement.meshes[0].influences(), rig.meshes[0].influences());
    }
}
