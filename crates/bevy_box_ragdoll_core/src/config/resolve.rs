//! Turns grouped, partially specified box configuration into one [`BoxDescriptor`] per bone.

use bevy::{log::warn, math::Vec3, platform::collections::HashSet};

use super::{BoxGroupConfig, RagdollDefaults, descriptor::BoxDescriptor};
use crate::{
    errors::{ConfigError, ConfigWarning},
    hierarchy::BoneHierarchy,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBox<B> {
    pub bone: B,
    pub name: String,
    pub descriptor: BoxDescriptor,
    pub warning: Option<ConfigWarning>,
}

/// Lazily resolves descriptors in group order, then bone order within each group.
///
/// Stops after yielding the first error, so that callers can keep whatever was resolved before
/// it.
pub struct DescriptorResolver<'a, H: BoneHierarchy> {
    hierarchy: &'a H,
    defaults: &'a RagdollDefaults,
    pending: Vec<(&'a BoxGroupConfig, &'a str)>,
    next: usize,
    seen: HashSet<&'a str>,
    failed: bool,
}

impl<'a, H: BoneHierarchy> DescriptorResolver<'a, H> {
    pub fn new(groups: &'a [BoxGroupConfig], defaults: &'a RagdollDefaults, hierarchy: &'a H) -> Self {
        let pending = groups
            .iter()
            .flat_map(|group| {
                group
                    .bone_names()
                    .iter()
                    .map(move |name| (group, name.as_str()))
            })
            .collect();

        Self {
            hierarchy,
            defaults,
            pending,
            next: 0,
            seen: HashSet::default(),
            failed: false,
        }
    }
}

impl<H: BoneHierarchy> Iterator for DescriptorResolver<'_, H> {
    type Item = Result<ResolvedBox<H::Bone>, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (group, name) = *self.pending.get(self.next)?;
        self.next += 1;

        if !self.seen.insert(name) {
            self.failed = true;
            return Some(Err(ConfigError::DuplicateBone(name.to_string())));
        }

        let Some(bone) = self.hierarchy.find_bone(name) else {
            self.failed = true;
            return Some(Err(ConfigError::MissingBone(name.to_string())));
        };

        let (descriptor, warning) = resolve_descriptor(group, self.defaults, self.hierarchy, bone);

        Some(Ok(ResolvedBox {
            bone,
            name: name.to_string(),
            descriptor,
            warning,
        }))
    }
}

/// Resolves every configured bone, failing if any of them cannot be resolved.
pub fn resolve_descriptors<H: BoneHierarchy>(
    groups: &[BoxGroupConfig],
    defaults: &RagdollDefaults,
    hierarchy: &H,
) -> Result<Vec<ResolvedBox<H::Bone>>, ConfigError> {
    DescriptorResolver::new(groups, defaults, hierarchy).collect()
}

pub fn resolve_descriptor<H: BoneHierarchy>(
    group: &BoxGroupConfig,
    defaults: &RagdollDefaults,
    hierarchy: &H,
    bone: H::Bone,
) -> (BoxDescriptor, Option<ConfigWarning>) {
    let dimension = |explicit: Option<f32>| explicit.or(group.size).unwrap_or(defaults.box_size);

    let mut warning = None;
    let offset = if group.put_box_in_bone_center || defaults.put_boxes_in_bone_center {
        match hierarchy.bone_length(bone) {
            Some(length) => length / 2.,
            None => {
                let name = hierarchy.bone_name(bone);
                warn!("Bone {name:?} has no length, so its box cannot be centered on it");
                warning = Some(ConfigWarning::MissingBoneLength(name));
                0.
            }
        }
    } else {
        group.box_offset.unwrap_or(defaults.box_offset)
    };

    let mut joint_limits = defaults.joint_limits;
    if let Some(min) = group.min {
        joint_limits.min = min;
    }
    if let Some(max) = group.max {
        joint_limits.max = max;
    }

    let descriptor = BoxDescriptor {
        dimensions: Vec3::new(
            dimension(group.width),
            dimension(group.height),
            dimension(group.depth),
        ),
        joint: group.joint.unwrap_or(defaults.joint),
        rotation_axis: group.rotation_axis.unwrap_or(defaults.rotation_axis),
        joint_limits,
        offset,
        offset_axis: group.bone_offset_axis.unwrap_or(defaults.bone_offset_axis),
        mass: group.mass.unwrap_or(defaults.mass),
        restitution: group.restitution.unwrap_or(defaults.restitution),
    };

    (descriptor, warning)
}
