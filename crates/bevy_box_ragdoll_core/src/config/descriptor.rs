use bevy::{math::Vec3, reflect::Reflect};
use serde::{Deserialize, Serialize};

use super::{AngleLimit, BoneAxis, JointKind};

/// Fully resolved box configuration for a single bone.
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDescriptor {
    /// Full box extents: width along x, height along y, depth along z.
    pub dimensions: Vec3,
    pub joint: JointKind,
    pub rotation_axis: BoneAxis,
    /// Degrees.
    pub joint_limits: AngleLimit,
    /// Distance from the bone origin to the box center, along `offset_axis`.
    pub offset: f32,
    pub offset_axis: BoneAxis,
    pub mass: f32,
    pub restitution: f32,
}

impl BoxDescriptor {
    pub fn width(&self) -> f32 {
        self.dimensions.x
    }

    pub fn height(&self) -> f32 {
        self.dimensions.y
    }

    pub fn depth(&self) -> f32 {
        self.dimensions.z
    }
}
