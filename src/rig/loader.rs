//! GLB avatar loader using the `gltf` crate.
//!
//! Builds an [`AvatarRig`] from a ReadyPlayerMe-style GLB: morph target
//! dictionaries come from each mesh's `targetNames` extras array, and the
//! Head/Neck/Spine2 joint chain comes from the node hierarchy with its
//! rest-pose rotations.

use glam::{EulerRot, Quat};
use std::path::Path;

use crate::config::AvatarConfig;
use crate::error::{KagamiError, RigError};

use super::{
    AvatarRig, Joint, JointChain, MorphMesh, JOINT_HEAD, JOINT_NECK, JOINT_SPINE,
    MORPH_MESH_NAMES,
};

/// Resolve an avatar name through the configured library and load its rig.
pub fn load_from_config(config: &AvatarConfig, name: &str) -> Result<AvatarRig, KagamiError> {
    let path = config
        .library
        .get(name)
        .ok_or_else(|| RigError::UnknownAvatar(name.to_string()))?;

    load_rig(name, path)
}

/// Load an avatar rig from a GLB file.
///
/// Every listed morph mesh is optional, but all three joints must exist
/// in the node hierarchy.
pub fn load_rig<P: AsRef<Path>>(name: &str, path: P) -> Result<AvatarRig, KagamiError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RigError::AssetNotFound(path.display().to_string()).into());
    }

    let (document, _buffers, _images) = gltf::import(path)
        .map_err(|e| RigError::Load(format!("{}: {}", path.display(), e)))?;

    // Morph meshes: any subset of the known names may be present
    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        let mesh_name = match mesh.name() {
            Some(n) => n,
            None => continue,
        };
        if !MORPH_MESH_NAMES.contains(&mesh_name) {
            continue;
        }

        let target_names = parse_target_names(&mesh);
        if target_names.is_empty() {
            tracing::debug!("Mesh {} has no targetNames extras, skipping", mesh_name);
            continue;
        }

        meshes.push(MorphMesh::new(mesh_name, &target_names));
    }

    if meshes.is_empty() {
        tracing::warn!(
            "Avatar '{}' has no morph-capable meshes, expressions will not animate",
            name
        );
    }

    let joints = JointChain {
        head: find_joint(&document, JOINT_HEAD)?,
        neck: find_joint(&document, JOINT_NECK)?,
        spine: find_joint(&document, JOINT_SPINE)?,
    };

    let rig = AvatarRig::new(name, meshes, joints);
    tracing::info!(
        "Loaded avatar '{}': {} morph meshes, {} morph targets",
        rig.name,
        rig.meshes.len(),
        rig.morph_target_count()
    );

    Ok(rig)
}

/// Find a named joint node and capture its rest-pose rotation.
fn find_joint(document: &gltf::Document, name: &str) -> Result<Joint, RigError> {
    let node = document
        .nodes()
        .find(|n| n.name() == Some(name))
        .ok_or_else(|| RigError::MissingJoint(name.to_string()))?;

    let (_translation, rotation, _scale) = node.transform().decomposed();
    let (x, y, z) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);

    Ok(Joint::new(name).with_rotation([x, y, z]))
}

/// Parse morph target names from mesh extras JSON.
fn parse_target_names(mesh: &gltf::Mesh) -> Vec<String> {
    if let Some(extras) = mesh.extras().as_ref() {
        if let Ok(val) = serde_json::from_str::<serde_json::Value>(extras.get()) {
            return target_names_from_value(&val);
        }
    }
    Vec::new()
}

/// Extract the `targetNames` string array from a mesh extras value.
fn target_names_from_value(val: &serde_json::Value) -> Vec<String> {
    val.get("targetNames")
        .and_then(|v| v.as_array())
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
