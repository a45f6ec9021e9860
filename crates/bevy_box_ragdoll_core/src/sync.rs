//! Per-frame synchronization between bones and box bodies.
//!
//! While kinematic, boxes follow the animated bones. While simulated, bones follow the boxes and
//! the mesh is moved so that the root bone stays on top of the root box.

use bevy::{
    log::debug,
    math::{Quat, Vec3},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::{
    active_bone::{ActiveBone, ActiveBoneId, ActiveBones},
    hierarchy::BoneHierarchy,
    physics::{BodyMode, RigidBodyBackend},
};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RagdollMode {
    /// Boxes follow the animated bones.
    #[default]
    Kinematic,
    /// Bones follow the simulated boxes.
    Simulated,
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct RagdollState {
    pub mode: RagdollMode,
    /// Sum of the corrections subtracted from the mesh position since the simulation was
    /// activated.
    pub mesh_offset: Vec3,
}

/// Moves `body` onto `bone`: the bone origin pushed `offset` along the bone-local `axis`, with
/// the bone's world rotation followed by `adjust`.
pub fn sync_body_with_bone<H, P>(
    hierarchy: &H,
    backend: &mut P,
    bone: H::Bone,
    body: P::Body,
    offset: f32,
    axis: Vec3,
    adjust: Quat,
) where
    H: BoneHierarchy,
    P: RigidBodyBackend,
{
    let position = hierarchy.world_position(bone) + hierarchy.direction(bone, axis) * offset;
    let rotation = hierarchy.world_rotation(bone) * adjust;
    backend.set_pose(body, position, rotation);
}

fn sync_and_settle<H, P>(
    hierarchy: &H,
    backend: &mut P,
    active: &ActiveBone<H::Bone, P::Body>,
    adjust: Quat,
) where
    H: BoneHierarchy,
    P: RigidBodyBackend,
{
    let descriptor = &active.descriptor;
    sync_body_with_bone(
        hierarchy,
        backend,
        active.bone,
        active.body,
        descriptor.offset,
        descriptor.offset_axis.to_vec3(),
        adjust,
    );
    backend.set_linear_velocity(active.body, Vec3::ZERO);
    backend.set_angular_velocity(active.body, Vec3::ZERO);
}

/// Orders active bones so that every bone comes after all of its active ancestors.
///
/// Bone rotations are written in world space, so a parent written after its child would drag the
/// child away from its box.
pub fn parent_first_order<H: BoneHierarchy, P>(
    hierarchy: &H,
    active_bones: &ActiveBones<H::Bone, P>,
) -> Vec<ActiveBoneId> {
    let depth = |bone: H::Bone| {
        let mut depth = 0usize;
        let mut current = hierarchy.parent(bone);
        while let Some(parent) = current {
            depth += 1;
            current = hierarchy.parent(parent);
        }
        depth
    };

    let mut order = active_bones
        .iter()
        .map(|active| (depth(active.bone), active.id))
        .collect::<Vec<_>>();
    order.sort_by_key(|(depth, _)| *depth);
    order.into_iter().map(|(_, id)| id).collect()
}

impl RagdollState {
    pub fn is_simulated(&self) -> bool {
        self.mode == RagdollMode::Simulated
    }

    /// Snaps every box onto its bone and clears its velocities.
    pub fn follow_bones<H, P>(
        &self,
        hierarchy: &H,
        backend: &mut P,
        active_bones: &ActiveBones<H::Bone, P::Body>,
    ) where
        H: BoneHierarchy,
        P: RigidBodyBackend,
    {
        for active in active_bones.iter() {
            sync_and_settle(hierarchy, backend, active, Quat::IDENTITY);
        }
    }

    /// Rotates every bone to match its box and shifts the mesh so the root bone sits on the root
    /// box. `order` must list the root first and parents before children.
    pub fn follow_bodies<H, P>(
        &mut self,
        hierarchy: &mut H,
        backend: &P,
        active_bones: &ActiveBones<H::Bone, P::Body>,
        root: ActiveBoneId,
        order: &[ActiveBoneId],
    ) where
        H: BoneHierarchy,
        P: RigidBodyBackend,
    {
        let apply_rotation = |hierarchy: &mut H, active: &ActiveBone<H::Bone, P::Body>| {
            let rotation = backend.rotation(active.body) * active.initial_rotation;
            hierarchy.set_world_rotation(active.bone, rotation);
        };

        if let Some(root) = active_bones.get(root) {
            let descriptor = &root.descriptor;
            let direction = hierarchy.direction(root.bone, descriptor.offset_axis.to_vec3());
            let target = hierarchy.world_position(root.bone) + direction * descriptor.offset;

            apply_rotation(hierarchy, root);

            let drift = target - backend.position(root.body);
            hierarchy.set_mesh_position(hierarchy.mesh_position() - drift);
            self.mesh_offset += drift;
        }

        for active in order
            .iter()
            .filter(|id| **id != root)
            .filter_map(|id| active_bones.get(*id))
        {
            apply_rotation(hierarchy, active);
        }
    }

    /// Aligns every box with the reference frame used by [`Self::follow_bodies`] and hands the
    /// boxes over to the physics engine.
    ///
    /// Returns `false` without touching anything if the simulation is already active.
    pub fn activate<H, P>(
        &mut self,
        hierarchy: &H,
        backend: &mut P,
        active_bones: &ActiveBones<H::Bone, P::Body>,
    ) -> bool
    where
        H: BoneHierarchy,
        P: RigidBodyBackend,
    {
        if self.is_simulated() {
            return false;
        }

        for active in active_bones.iter() {
            sync_and_settle(hierarchy, backend, active, active.initial_rotation.inverse());
            backend.set_body_mode(active.body, BodyMode::Dynamic);
        }

        self.mode = RagdollMode::Simulated;
        self.mesh_offset = Vec3::ZERO;
        debug!("Ragdoll simulation activated for {} boxes", active_bones.len());
        true
    }

    /// Returns the boxes to kinematic follow and undoes the mesh correction applied while
    /// simulating. Bones keep their last simulated rotation.
    ///
    /// Returns `false` if the simulation was not active.
    pub fn deactivate<H, P>(
        &mut self,
        hierarchy: &mut H,
        backend: &mut P,
        active_bones: &ActiveBones<H::Bone, P::Body>,
    ) -> bool
    where
        H: BoneHierarchy,
        P: RigidBodyBackend,
    {
        if !self.is_simulated() {
            return false;
        }

        for active in active_bones.iter() {
            backend.set_body_mode(active.body, BodyMode::Kinematic);
        }
        hierarchy.set_mesh_position(hierarchy.mesh_position() + self.mesh_offset);

        self.mode = RagdollMode::Kinematic;
        self.mesh_offset = Vec3::ZERO;
        debug!("Ragdoll simulation deactivated");
        true
    }
}
