use bevy::{
    ecs::{
        entity::Entity,
        hierarchy::{ChildOf, Children},
        name::Name,
        query::{Or, With, Without},
        system::{Query, SystemParam},
    },
    math::{Quat, Vec3},
    mesh::{Mesh3d, skinning::SkinnedMesh},
    platform::collections::HashSet,
    transform::components::Transform,
};
use bevy_box_ragdoll_core::hierarchy::BoneHierarchy;

use crate::rig::{BoneLength, RagdollBox};

#[derive(SystemParam)]
pub struct SkeletonQueries<'w, 's> {
    pub nodes: Query<
        'w,
        's,
        (
            Option<&'static Name>,
            Option<&'static ChildOf>,
            &'static mut Transform,
            Option<&'static BoneLength>,
        ),
        Without<RagdollBox>,
    >,
    pub children: Query<'w, 's, &'static Children>,
    pub meshes: Query<'w, 's, (), Or<(With<Mesh3d>, With<SkinnedMesh>)>>,
    pub skins: Query<'w, 's, &'static SkinnedMesh>,
}

impl SkeletonQueries<'_, '_> {
    fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            if let Ok(children) = self.children.get(current) {
                for &child in children {
                    found.push(child);
                    pending.push(child);
                }
            }
        }
        found
    }
}

/// Skeleton of one rig, read from and written to the entity hierarchy.
///
/// Poses are composed from local [`Transform`]s rather than read from `GlobalTransform`, so writes
/// made earlier in the frame are visible right away.
///
/// If a [`SkinnedMesh`] below the character lists joints, only those joints (and entities with a
/// [`BoneLength`]) are bones. Otherwise every entity below the skeleton root that is not a mesh
/// node is a bone.
pub struct RigSkeleton<'q, 'w, 's> {
    queries: &'q mut SkeletonQueries<'w, 's>,
    character: Entity,
    skeleton_root: Entity,
    skin_joints: HashSet<Entity>,
}

impl<'q, 'w, 's> RigSkeleton<'q, 'w, 's> {
    pub fn new(
        queries: &'q mut SkeletonQueries<'w, 's>,
        character: Entity,
        skeleton_root: Entity,
    ) -> Self {
        let skin_joints = queries
            .descendants(character)
            .into_iter()
            .filter_map(|entity| queries.skins.get(entity).ok())
            .flat_map(|skin| skin.joints.iter().copied())
            .collect();
        Self {
            queries,
            character,
            skeleton_root,
            skin_joints,
        }
    }

    /// Transform of `entity` in world space, composed through every ancestor with a [`Transform`].
    pub fn world_transform(&self, entity: Entity) -> Transform {
        match self.queries.nodes.get(entity) {
            Ok((_, _, transform, _)) => self.parent_world_transform(entity) * *transform,
            Err(_) => Transform::IDENTITY,
        }
    }

    fn parent_world_transform(&self, entity: Entity) -> Transform {
        match self.queries.nodes.get(entity) {
            Ok((_, Some(parent), ..)) => self.world_transform(parent.parent()),
            _ => Transform::IDENTITY,
        }
    }

    /// Mesh nodes carry a mesh themselves, or only have mesh primitives as children.
    fn is_mesh_node(&self, entity: Entity) -> bool {
        if self.queries.meshes.contains(entity) {
            return true;
        }
        match self.queries.children.get(entity) {
            Ok(children) if !children.is_empty() => children
                .into_iter()
                .all(|&child| self.queries.meshes.contains(child)),
            _ => false,
        }
    }

    fn is_bone(&self, entity: Entity) -> bool {
        if self.skin_joints.is_empty() {
            return !self.is_mesh_node(entity);
        }
        self.skin_joints.contains(&entity)
            || self
                .queries
                .nodes
                .get(entity)
                .is_ok_and(|(.., length)| length.is_some())
    }
}

impl BoneHierarchy for RigSkeleton<'_, '_, '_> {
    type Bone = Entity;

    fn find_bone(&self, name: &str) -> Option<Entity> {
        self.queries
            .descendants(self.skeleton_root)
            .into_iter()
            .filter(|bone| self.is_bone(*bone))
            .find(|bone| {
                self.queries
                    .nodes
                    .get(*bone)
                    .ok()
                    .and_then(|(bone_name, ..)| bone_name)
                    .is_some_and(|bone_name| bone_name.as_str() == name)
            })
    }

    fn bone_name(&self, bone: Entity) -> String {
        self.queries
            .nodes
            .get(bone)
            .ok()
            .and_then(|(name, ..)| name)
            .map(|name| name.as_str().to_string())
            .unwrap_or_default()
    }

    fn parent(&self, bone: Entity) -> Option<Entity> {
        let (_, parent, ..) = self.queries.nodes.get(bone).ok()?;
        parent
            .map(ChildOf::parent)
            .filter(|parent| *parent != self.skeleton_root)
    }

    fn top_level_bones(&self) -> Vec<Entity> {
        self.queries
            .children
            .get(self.skeleton_root)
            .map(|children| {
                children
                    .into_iter()
                    .copied()
                    .filter(|child| self.is_bone(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn world_position(&self, bone: Entity) -> Vec3 {
        self.world_transform(bone).translation
    }

    fn world_rotation(&self, bone: Entity) -> Quat {
        self.world_transform(bone).rotation
    }

    fn set_world_rotation(&mut self, bone: Entity, rotation: Quat) {
        let parent_rotation = self.parent_world_transform(bone).rotation;
        if let Ok((_, _, mut transform, _)) = self.queries.nodes.get_mut(bone) {
            transform.rotation = parent_rotation.inverse() * rotation;
        }
    }

    fn bone_length(&self, bone: Entity) -> Option<f32> {
        let (.., length) = self.queries.nodes.get(bone).ok()?;
        length.map(|length| length.0)
    }

    fn mesh_position(&self) -> Vec3 {
        self.world_transform(self.character).translation
    }

    fn set_mesh_position(&mut self, position: Vec3) {
        let local = self
            .parent_world_transform(self.character)
            .compute_affine()
            .inverse()
            .transform_point3(position);
        if let Ok((_, _, mut transform, _)) = self.queries.nodes.get_mut(self.character) {
            transform.translation = local;
        }
    }
}
