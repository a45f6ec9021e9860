use std::fmt::Debug;

use bevy::math::{Quat, Vec3};

/// Read/write access to an animated skeleton.
///
/// World space here includes the transform of the mesh the skeleton deforms, so moving the mesh
/// moves every bone.
pub trait BoneHierarchy {
    type Bone: Copy + Eq + Debug;

    fn find_bone(&self, name: &str) -> Option<Self::Bone>;

    fn bone_name(&self, bone: Self::Bone) -> String;

    /// Parent bone, or `None` for top-level bones.
    fn parent(&self, bone: Self::Bone) -> Option<Self::Bone>;

    /// Bones without a parent. A well-formed skeleton has exactly one.
    fn top_level_bones(&self) -> Vec<Self::Bone>;

    fn world_position(&self, bone: Self::Bone) -> Vec3;

    fn world_rotation(&self, bone: Self::Bone) -> Quat;

    fn set_world_rotation(&mut self, bone: Self::Bone, rotation: Quat);

    /// Length of the bone, if the skeleton carries that metadata.
    fn bone_length(&self, bone: Self::Bone) -> Option<f32>;

    fn mesh_position(&self) -> Vec3;

    fn set_mesh_position(&mut self, position: Vec3);

    /// World-space direction of a bone-local axis.
    fn direction(&self, bone: Self::Bone, local_axis: Vec3) -> Vec3 {
        self.world_rotation(bone) * local_axis
    }
}
