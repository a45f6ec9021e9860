use bevy::{
    log::{debug, error},
    math::{Quat, Vec3},
};

use crate::{
    active_bone::ActiveBones,
    config::{RagdollConfig, descriptor::BoxDescriptor, resolve::DescriptorResolver},
    errors::{ConfigError, ConfigWarning},
    hierarchy::BoneHierarchy,
    physics::{BodyMode, BoxBodySpec, RigidBodyBackend},
};

/// Outcome of a successful collider build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollidersReport {
    pub built: usize,
    pub warnings: Vec<ConfigWarning>,
}

/// World position of the center of a bone's box: the bone origin moved `offset` along the
/// descriptor's offset axis.
pub fn box_center<H: BoneHierarchy>(
    hierarchy: &H,
    bone: H::Bone,
    descriptor: &BoxDescriptor,
) -> Vec3 {
    let direction = hierarchy.direction(bone, descriptor.offset_axis.to_vec3());
    hierarchy.world_position(bone) + direction * descriptor.offset
}

/// Creates one box body per configured bone and records it in `active_bones`.
///
/// On a configuration error the remaining bones are skipped. Bodies created before the error
/// stay in place.
pub fn build_colliders<H, P>(
    config: &RagdollConfig,
    hierarchy: &H,
    backend: &mut P,
    active_bones: &mut ActiveBones<H::Bone, P::Body>,
) -> Result<CollidersReport, ConfigError>
where
    H: BoneHierarchy,
    P: RigidBodyBackend,
{
    let settings = &config.settings;
    let visibility = settings.show_boxes.then_some(settings.box_visibility);
    let mut report = CollidersReport::default();

    for resolved in DescriptorResolver::new(&config.groups, &config.defaults, hierarchy) {
        let resolved = resolved.inspect_err(|err| error!("Ragdoll collider creation failed: {err}"))?;

        let descriptor = resolved.descriptor;
        let spec = BoxBodySpec {
            bone_name: resolved.name.clone(),
            dimensions: descriptor.dimensions,
            position: box_center(hierarchy, resolved.bone, &descriptor),
            rotation: Quat::IDENTITY,
            mass: descriptor.mass,
            restitution: descriptor.restitution,
            mode: BodyMode::Kinematic,
        };
        let body = backend.create_box_body(&spec);
        backend.set_box_visibility(body, visibility);

        let initial_rotation = hierarchy.world_rotation(resolved.bone);
        let id = active_bones.insert(
            resolved.name,
            resolved.bone,
            body,
            descriptor,
            initial_rotation,
        )?;
        debug!("Created collider {id} for bone {:?}", spec.bone_name);

        report.built += 1;
        report.warnings.extend(resolved.warning);
    }

    Ok(report)
}
