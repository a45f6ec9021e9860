pub mod descriptor;
pub mod loader;
pub mod resolve;

use bevy::{
    asset::Asset,
    math::Vec3,
    reflect::{Reflect, std_traits::ReflectDefault},
};
use serde::{Deserialize, Serialize};

/// Axis expressed in a bone's local frame. The world-space direction is obtained by rotating it
/// with the bone's world rotation.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoneAxis {
    X,
    Y,
    Z,
    Custom(Vec3),
}

impl BoneAxis {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            BoneAxis::X => Vec3::X,
            BoneAxis::Y => Vec3::Y,
            BoneAxis::Z => Vec3::Z,
            BoneAxis::Custom(axis) => axis.normalize_or_zero(),
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    /// Single rotational degree of freedom around the joint's rotation axis.
    Hinge,
    /// Free rotation around the pivot, twist measured around the rotation axis.
    BallAndSocket,
    Fixed,
    /// Translation along the rotation axis, no relative rotation.
    Prismatic,
}

/// Joint limits in degrees.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleLimit {
    pub min: f32,
    pub max: f32,
}

impl AngleLimit {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn to_radians(self) -> AngleLimit {
        AngleLimit {
            min: self.min.to_radians(),
            max: self.max.to_radians(),
        }
    }
}

/// Values used for every field a box group leaves unset.
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct RagdollDefaults {
    pub joint: JointKind,
    pub rotation_axis: BoneAxis,
    pub joint_limits: AngleLimit,
    pub box_offset: f32,
    pub bone_offset_axis: BoneAxis,
    pub mass: f32,
    pub restitution: f32,
    /// Edge length used for box dimensions that are neither given explicitly nor through `size`.
    pub box_size: f32,
    /// Places every box halfway along its bone, as if each group set `put_box_in_bone_center`.
    pub put_boxes_in_bone_center: bool,
}

impl Default for RagdollDefaults {
    fn default() -> Self {
        Self {
            joint: JointKind::Hinge,
            rotation_axis: BoneAxis::X,
            joint_limits: AngleLimit::new(-90., 90.),
            box_offset: 0.,
            bone_offset_axis: BoneAxis::Y,
            mass: 1.,
            restitution: 0.,
            box_size: 1.,
            put_boxes_in_bone_center: false,
        }
    }
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct RagdollSettings {
    /// Whether bodies linked by a joint collide with each other.
    pub joint_collisions: bool,
    pub show_boxes: bool,
    /// Opacity of the boxes while they are shown.
    pub box_visibility: f32,
    /// Size of the debug markers placed on joint pivots. Zero disables them.
    pub pivot_marker_size: f32,
    /// Skips the kinematic box-follows-bone step.
    pub disable_box_bone_sync: bool,
}

impl Default for RagdollSettings {
    fn default() -> Self {
        Self {
            joint_collisions: false,
            show_boxes: false,
            box_visibility: 0.6,
            pivot_marker_size: 0.,
            disable_box_bone_sync: false,
        }
    }
}

/// Box parameters shared by one or more bones. Unset fields fall back to [`RagdollDefaults`].
#[derive(Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct BoxGroupConfig {
    /// Single bone this group applies to. Takes precedence over `bones`.
    pub bone: Option<String>,
    pub bones: Vec<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
    /// Uniform edge length for dimensions not given explicitly.
    pub size: Option<f32>,
    pub joint: Option<JointKind>,
    pub rotation_axis: Option<BoneAxis>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub box_offset: Option<f32>,
    pub bone_offset_axis: Option<BoneAxis>,
    pub put_box_in_bone_center: bool,
    pub mass: Option<f32>,
    pub restitution: Option<f32>,
}

impl BoxGroupConfig {
    pub fn for_bone(name: impl Into<String>) -> Self {
        Self {
            bone: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn for_bones<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            bones: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Names of the bones this group applies to, in order.
    pub fn bone_names(&self) -> &[String] {
        match &self.bone {
            Some(bone) => std::slice::from_ref(bone),
            None => &self.bones,
        }
    }
}

/// Full ragdoll description, as stored in `*.boxrag.ron` files.
#[derive(Asset, Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct RagdollConfig {
    pub defaults: RagdollDefaults,
    pub settings: RagdollSettings,
    pub groups: Vec<BoxGroupConfig>,
}

impl RagdollConfig {
    pub fn new(groups: Vec<BoxGroupConfig>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Total number of bone names across all groups.
    pub fn bone_count(&self) -> usize {
        self.groups.iter().map(|group| group.bone_names().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bone_takes_precedence_over_list() {
        let group = BoxGroupConfig {
            bone: Some("Head".into()),
            bones: vec!["Neck".into(), "Spine".into()],
            ..Default::default()
        };

        assert_eq!(group.bone_names(), &["Head".to_string()]);
    }

    #[test]
    fn parse_config_from_ron() {
        let source = r#"(
            defaults: (joint: BallAndSocket, box_size: 0.25),
            settings: (joint_collisions: true),
            groups: [
                (bones: ["UpperArm.L", "UpperArm.R"], height: Some(0.3), rotation_axis: Some(Z)),
                (bone: Some("Head"), size: Some(0.2), put_box_in_bone_center: true),
            ],
        )"#;

        let config: RagdollConfig = ron::de::from_str(source).unwrap();

        assert_eq!(config.defaults.joint, JointKind::BallAndSocket);
        assert_eq!(config.defaults.box_size, 0.25);
        assert_eq!(config.defaults.bone_offset_axis, BoneAxis::Y);
        assert!(config.settings.joint_collisions);
        assert_eq!(config.settings.box_visibility, 0.6);
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[0].rotation_axis, Some(BoneAxis::Z));
        assert!(config.groups[1].put_box_in_bone_center);
        assert_eq!(config.bone_count(), 3);
    }

    #[test]
    fn custom_axis_is_normalized() {
        let axis = BoneAxis::Custom(Vec3::new(0., 2., 0.));
        assert_eq!(axis.to_vec3(), Vec3::Y);
    }
}
