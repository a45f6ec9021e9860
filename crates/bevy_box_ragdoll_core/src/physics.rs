use std::fmt::Debug;

use bevy::{
    math::{Mat4, Quat, Vec3},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::config::{AngleLimit, JointKind};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyMode {
    /// Pose is driven from outside the simulation.
    Kinematic,
    Dynamic,
}

/// Everything needed to create the rigid body of one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBodySpec {
    /// Used to label the created body.
    pub bone_name: String,
    pub dimensions: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub mass: f32,
    pub restitution: f32,
    pub mode: BodyMode,
}

/// Constraint between a parent body and a child body.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub kind: JointKind,
    /// Attachment point in the parent body's local frame.
    pub main_pivot: Vec3,
    /// Attachment point in the child body's local frame.
    pub connected_pivot: Vec3,
    pub main_axis: Vec3,
    pub connected_axis: Vec3,
    /// Whether the two linked bodies collide with each other.
    pub collision: bool,
    /// Radians.
    pub limits: AngleLimit,
}

/// Access to the rigid bodies of the physics engine simulating the ragdoll.
pub trait RigidBodyBackend {
    type Body: Copy + Eq + Debug;
    type Joint: Copy + Eq + Debug;

    fn create_box_body(&mut self, spec: &BoxBodySpec) -> Self::Body;

    fn position(&self, body: Self::Body) -> Vec3;

    fn rotation(&self, body: Self::Body) -> Quat;

    fn set_pose(&mut self, body: Self::Body, position: Vec3, rotation: Quat);

    fn set_linear_velocity(&mut self, body: Self::Body, velocity: Vec3);

    fn set_angular_velocity(&mut self, body: Self::Body, velocity: Vec3);

    fn set_body_mode(&mut self, body: Self::Body, mode: BodyMode);

    /// `None` hides the box, `Some(alpha)` shows it with the given opacity.
    fn set_box_visibility(&mut self, body: Self::Body, visibility: Option<f32>);

    fn attach_joint(&mut self, parent: Self::Body, child: Self::Body, spec: &JointSpec)
    -> Self::Joint;

    fn destroy_joint(&mut self, joint: Self::Joint);

    fn destroy_body(&mut self, body: Self::Body);

    fn world_matrix(&self, body: Self::Body) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(body), self.position(body))
    }

    /// Debug-only marker attached to `parent`, at `world_position`.
    fn spawn_pivot_marker(&mut self, _parent: Self::Body, _world_position: Vec3, _size: f32) {}
}
