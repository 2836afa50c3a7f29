//! Avatar rig
//!
//! The mutable retarget surface of one loaded avatar: the morph-capable
//! meshes plus the head/neck/spine joint chain. A rig is rebuilt wholesale
//! on every avatar load, so nothing from a previous avatar can leak into
//! the next one.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Joint names the loader requires in every avatar
pub const JOINT_HEAD: &str = "Head";
pub const JOINT_NECK: &str = "Neck";
pub const JOINT_SPINE: &str = "Spine2";

/// Morph-capable mesh names in ReadyPlayerMe avatars. Any subset may be
/// present; a half-body avatar without a beard simply has fewer meshes.
pub const MORPH_MESH_NAMES: &[&str] = &[
    "Wolf3D_Head",
    "Wolf3D_Teeth",
    "Wolf3D_Tongue",
    "Wolf3D_Beard",
    "Wolf3D_Avatar",
    "Wolf3D_Head_Custom",
];

/// A mesh whose morph targets are addressable by category name.
///
/// The dictionary is fixed at load time; only the influence weights change
/// afterwards.
#[derive(Debug, Clone)]
pub struct MorphMesh {
    /// Node name in the source asset, e.g. `"Wolf3D_Head"`
    pub name: String,
    /// Category name → morph target index
    dictionary: HashMap<String, usize>,
    /// Current influence per morph target
    influences: Vec<f32>,
}

impl MorphMesh {
    /// Build a mesh from its ordered morph target name list, all
    /// influences zeroed.
    pub fn new(name: impl Into<String>, target_names: &[String]) -> Self {
        let mut dictionary = HashMap::new();
        for (i, target) in target_names.iter().enumerate() {
            dictionary.insert(target.clone(), i);
        }
        Self {
            name: name.into(),
            influences: vec![0.0; target_names.len()],
            dictionary,
        }
    }

    /// Look up the morph target index for a category name
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.dictionary.get(category).copied()
    }

    /// Overwrite one influence weight. Out-of-range indices are ignored.
    pub fn set_influence(&mut self, index: usize, weight: f32) {
        if let Some(slot) = self.influences.get_mut(index) {
            *slot = weight;
        }
    }

    /// Current influence weights, indexed by morph target
    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    pub fn target_count(&self) -> usize {
        self.influences.len()
    }
}

/// A skeleton joint with a mutable local rotation (XYZ Euler, radians)
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub rotation: [f32; 3],
}

impl Joint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rotation: [0.0; 3],
        }
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }
}

/// The fixed three-link chain pose damping writes to
#[derive(Debug, Clone)]
pub struct JointChain {
    pub head: Joint,
    pub neck: Joint,
    pub spine: Joint,
}

impl Default for JointChain {
    fn default() -> Self {
        Self {
            head: Joint::new(JOINT_HEAD),
            neck: Joint::new(JOINT_NECK),
            spine: Joint::new(JOINT_SPINE),
        }
    }
}

/// One loaded avatar's retarget surface
#[derive(Debug, Clone)]
pub struct AvatarRig {
    /// Avatar name from the configured library
    pub name: String,
    pub meshes: Vec<MorphMesh>,
    pub joints: JointChain,
}

impl AvatarRig {
    pub fn new(name: impl Into<String>, meshes: Vec<MorphMesh>, joints: JointChain) -> Self {
        Self {
            name: name.into(),
            meshes,
            joints,
        }
    }

    /// Total morph targets across all meshes
    pub fn morph_target_count(&self) -> usize {
        self.meshes.iter().map(|m| m.target_count()).sum()
    }

    /// Snapshot the current rig state for publication
    pub fn pose(&self) -> RigPose {
        RigPose {
            avatar: self.name.clone(),
            meshes: self
                .meshes
                .iter()
                .map(|m| MeshPose {
                    name: m.name.clone(),
                    influences: m.influences.clone(),
                })
                .collect(),
            head: self.joints.head.rotation,
            neck: self.joints.neck.rotation,
            spine: self.joints.spine.rotation,
        }
    }
}

/// Morph influences of one mesh, as published to consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPose {
    pub name: String,
    pub influences: Vec<f32>,
}

/// Serializable rig state published once per render tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigPose {
    pub avatar: String,
    pub meshes: Vec<MeshPose>,
    /// Joint rotations, XYZ Euler radians
    pub head: [f32; 3],
    pub neck: [f32; 3],
    pub spine: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_mesh() -> MorphMesh {
        MorphMesh::new(
            "Wolf3D_Head",
            &[
                "browDownLeft".to_string(),
                "eyeBlinkLeft".to_string(),
                "jawOpen".to_string(),
            ],
        )
    }

    #[test]
    fn test_dictionary_from_target_names() {
        let mesh = head_mesh();

        assert_eq!(mesh.index_of("browDownLeft"), Some(0));
        assert_eq!(mesh.index_of("eyeBlinkLeft"), Some(1));
        assert_eq!(mesh.index_of("jawOpen"), Some(2));
        assert_eq!(mesh.index_of("tongueOut"), None);
        assert_eq!(mesh.target_count(), 3);
    }

    #[test]
    fn test_influences_start_zeroed() {
        let mesh = head_mesh();
        assert_eq!(mesh.influences(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_influence_overwrites_single_slot() {
        let mut mesh = head_mesh();

        mesh.set_influence(2, 0.8);
        assert_eq!(mesh.influences(), &[0.0, 0.0, 0.8]);

        // Untouched slots persist across writes
        mesh.set_influence(0, 0.3);
        assert_eq!(mesh.influences(), &[0.3, 0.0, 0.8]);
    }

    #[test]
    fn test_set_influence_out_of_range_is_ignored() {
        let mut mesh = head_mesh();
        mesh.set_influence(99, 1.0);
        assert_eq!(mesh.influences(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pose_snapshot_captures_state() {
        let mut rig = AvatarRig::new("man", vec![head_mesh()], JointChain::default());
        rig.meshes[0].set_influence(1, 0.5);
        rig.joints.head.rotation = [0.1, 0.2, 0.3];

        let pose = rig.pose();

        assert_eq!(pose.avatar, "man");
        assert_eq!(pose.meshes.len(), 1);
        assert_eq!(pose.meshes[0].name, "Wolf3D_Head");
        assert_eq!(pose.meshes[0].influences, vec![0.0, 0.5, 0.0]);
        assert_eq!(pose.head, [0.1, 0.2, 0.3]);
        assert_eq!(pose.neck, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_mesh_has_no_targets() {
        let mesh = MorphMesh::new("Wolf3D_Teeth", &[]);
        assert_eq!(mesh.target_count(), 0);
        assert_eq!(mesh.index_of("jawOpen"), None);
    }
}
