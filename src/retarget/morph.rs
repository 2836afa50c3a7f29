//! Category name → morph target mapping.

use crate::expression::ExpressionScore;
use crate::rig::MorphMesh;

/// Write a cycle's expression scores into every morph-capable mesh.
///
/// Each score is looked up by category name in each mesh's dictionary. On
/// a hit, the influence at that index is overwritten with the score; a
/// mesh with no target for the category skips it silently. Targets the
/// snapshot does not name keep their previous weights.
///
/// Cost is scores × meshes, both small (one face, a handful of meshes).
pub fn apply_expressions(scores: &[ExpressionScore], meshes: &mut [MorphMesh]) {
    for score in scores {
        for mesh in meshes.iter_mut() {
            if let Some(index) = mesh.index_of(&score.category) {
                mesh.set_influence(index, score.score);
            }
        }
    }
}
