//! Head pose decomposition and damping.
//!
//! The detector reports head pose as a 4x4 facial transformation matrix.
//! Decomposition extracts intrinsic XYZ Euler angles once per detection
//! cycle; damping then distributes attenuated copies of that rotation down
//! the head/neck/spine chain so the body follows the head with decreasing
//! intensity.

use glam::{EulerRot, Mat4, Quat};
use serde::{Deserialize, Serialize};

/// Full rotation goes to the head, attenuated copies flow down the chain.
const HEAD_DIVISOR: f32 = 3.0;
const NECK_DIVISOR: f32 = 5.0;
const SPINE_DIVISOR: f32 = 10.0;

/// Forward pitch bias on the neck, radians. Keeps the neck from looking
/// hyper-extended when the head pitches straight ahead.
const NECK_PITCH_OFFSET: f32 = 0.3;

/// Euler rotation extracted from one facial transformation matrix, radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationSample {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Extract intrinsic XYZ Euler angles from a homogeneous transform.
    ///
    /// Translation is discarded; only the rotation block matters. The XYZ
    /// order matches the renderer-side Euler convention, so angles can be
    /// written to joint rotations without reordering.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (x, y, z) = Quat::from_mat4(matrix).to_euler(EulerRot::XYZ);
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    fn divided(&self, divisor: f32) -> Self {
        Self {
            x: self.x / divisor,
            y: self.y / divisor,
            z: self.z / divisor,
        }
    }
}

/// Damped per-joint rotations for one detection cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedPose {
    pub head: RotationSample,
    pub neck: RotationSample,
    pub spine: RotationSample,
}

/// Distribute a head rotation across the joint chain.
///
/// Divisors are fixed design constants, not tuning knobs. The neck also
/// receives a constant forward pitch bias after division. Output is not
/// clamped; degenerate detector output passes through unguarded.
pub fn distribute(rotation: RotationSample) -> DampedPose {
    let mut neck = rotation.divided(NECK_DIVISOR);
    neck.x += NECK_PITCH_OFFSET;

    DampedPose {
        head: rotation.divided(HEAD_DIVISOR),
        neck,
        spine: rotation.divided(SPINE_DIVISOR),
    }
}
