use bevy::log::error;

use crate::{
    active_bone::{ActiveBoneId, ActiveBones},
    errors::TopologyError,
    hierarchy::BoneHierarchy,
};

/// Finds the unique top-level bone of the skeleton and checks that it has a collider.
pub fn resolve_root<H: BoneHierarchy, P>(
    hierarchy: &H,
    active_bones: &ActiveBones<H::Bone, P>,
) -> Result<ActiveBoneId, TopologyError> {
    let roots = hierarchy.top_level_bones();
    let root = match roots.as_slice() {
        [] => Err(TopologyError::NoSkeletonRoot),
        [root] => Ok(*root),
        _ => Err(TopologyError::MultipleSkeletonRoots(roots.len())),
    }
    .inspect_err(|err| error!("Ragdoll creation failed: {err}"))?;

    let root_name = hierarchy.bone_name(root);
    active_bones.id_of(&root_name).ok_or_else(|| {
        let err = TopologyError::RootNotActive(root_name);
        error!("Ragdoll creation failed: {err}");
        err
    })
}
