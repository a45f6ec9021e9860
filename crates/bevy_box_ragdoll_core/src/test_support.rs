//! In-memory skeleton and physics backend used by the unit tests.

use bevy::{
    math::{Quat, Vec3},
    transform::components::Transform,
};

use crate::{
    hierarchy::BoneHierarchy,
    physics::{BodyMode, BoxBodySpec, JointSpec, RigidBodyBackend},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestBone(pub usize);

#[derive(Debug, Clone)]
struct BoneEntry {
    name: String,
    parent: Option<TestBone>,
    local: Transform,
    length: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct TestSkeleton {
    bones: Vec<BoneEntry>,
    mesh: Transform,
}

impl TestSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: &str, translation: Vec3) -> TestBone {
        self.push(name, None, translation)
    }

    pub fn add_bone(&mut self, name: &str, parent: TestBone, translation: Vec3) -> TestBone {
        self.push(name, Some(parent), translation)
    }

    fn push(&mut self, name: &str, parent: Option<TestBone>, translation: Vec3) -> TestBone {
        self.bones.push(BoneEntry {
            name: name.to_string(),
            parent,
            local: Transform::from_translation(translation),
            length: None,
        });
        TestBone(self.bones.len() - 1)
    }

    pub fn set_length(&mut self, bone: TestBone, length: f32) {
        self.bones[bone.0].length = Some(length);
    }

    pub fn set_local_rotation(&mut self, bone: TestBone, rotation: Quat) {
        self.bones[bone.0].local.rotation = rotation;
    }

    pub fn world_transform(&self, bone: TestBone) -> Transform {
        let entry = &self.bones[bone.0];
        match entry.parent {
            Some(parent) => self.world_transform(parent) * entry.local,
            None => self.mesh * entry.local,
        }
    }
}

impl BoneHierarchy for TestSkeleton {
    type Bone = TestBone;

    fn find_bone(&self, name: &str) -> Option<TestBone> {
        self.bones
            .iter()
            .position(|entry| entry.name == name)
            .map(TestBone)
    }

    fn bone_name(&self, bone: TestBone) -> String {
        self.bones[bone.0].name.clone()
    }

    fn parent(&self, bone: TestBone) -> Option<TestBone> {
        self.bones[bone.0].parent
    }

    fn top_level_bones(&self) -> Vec<TestBone> {
        (0..self.bones.len())
            .map(TestBone)
            .filter(|bone| self.bones[bone.0].parent.is_none())
            .collect()
    }

    fn world_position(&self, bone: TestBone) -> Vec3 {
        self.world_transform(bone).translation
    }

    fn world_rotation(&self, bone: TestBone) -> Quat {
        self.world_transform(bone).rotation
    }

    fn set_world_rotation(&mut self, bone: TestBone, rotation: Quat) {
        let parent_rotation = match self.bones[bone.0].parent {
            Some(parent) => self.world_rotation(parent),
            None => self.mesh.rotation,
        };
        self.bones[bone.0].local.rotation = parent_rotation.inverse() * rotation;
    }

    fn bone_length(&self, bone: TestBone) -> Option<f32> {
        self.bones[bone.0].length
    }

    fn mesh_position(&self) -> Vec3 {
        self.mesh.translation
    }

    fn set_mesh_position(&mut self, position: Vec3) {
        self.mesh.translation = position;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestBody(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestJoint(pub usize);

#[derive(Debug, Clone)]
pub struct TestBodyState {
    pub spec: BoxBodySpec,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mode: BodyMode,
    pub visibility: Option<f32>,
    pub destroyed: bool,
}

#[derive(Debug, Clone)]
pub struct TestJointState {
    pub parent: TestBody,
    pub child: TestBody,
    pub spec: JointSpec,
    pub destroyed: bool,
}

/// Records every command instead of simulating anything. Tests move bodies by hand to stand in
/// for a physics step.
#[derive(Debug, Clone, Default)]
pub struct TestPhysics {
    pub bodies: Vec<TestBodyState>,
    pub joints: Vec<TestJointState>,
    pub markers: Vec<(TestBody, Vec3, f32)>,
}

impl TestPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, body: TestBody) -> &TestBodyState {
        &self.bodies[body.0]
    }

    pub fn body_mut(&mut self, body: TestBody) -> &mut TestBodyState {
        &mut self.bodies[body.0]
    }

    pub fn live_joints(&self) -> impl Iterator<Item = &TestJointState> {
        self.joints.iter().filter(|joint| !joint.destroyed)
    }
}

impl RigidBodyBackend for TestPhysics {
    type Body = TestBody;
    type Joint = TestJoint;

    fn create_box_body(&mut self, spec: &BoxBodySpec) -> TestBody {
        self.bodies.push(TestBodyState {
            spec: spec.clone(),
            position: spec.position,
            rotation: spec.rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mode: spec.mode,
            visibility: None,
            destroyed: false,
        });
        TestBody(self.bodies.len() - 1)
    }

    fn position(&self, body: TestBody) -> Vec3 {
        self.bodies[body.0].position
    }

    fn rotation(&self, body: TestBody) -> Quat {
        self.bodies[body.0].rotation
    }

    fn set_pose(&mut self, body: TestBody, position: Vec3, rotation: Quat) {
        let state = &mut self.bodies[body.0];
        state.position = position;
        state.rotation = rotation;
    }

    fn set_linear_velocity(&mut self, body: TestBody, velocity: Vec3) {
        self.bodies[body.0].linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, body: TestBody, velocity: Vec3) {
        self.bodies[body.0].angular_velocity = velocity;
    }

    fn set_body_mode(&mut self, body: TestBody, mode: BodyMode) {
        self.bodies[body.0].mode = mode;
    }

    fn set_box_visibility(&mut self, body: TestBody, visibility: Option<f32>) {
        self.bodies[body.0].visibility = visibility;
    }

    fn attach_joint(&mut self, parent: TestBody, child: TestBody, spec: &JointSpec) -> TestJoint {
        self.joints.push(TestJointState {
            parent,
            child,
            spec: spec.clone(),
            destroyed: false,
        });
        TestJoint(self.joints.len() - 1)
    }

    fn destroy_joint(&mut self, joint: TestJoint) {
        self.joints[joint.0].destroyed = true;
    }

    fn destroy_body(&mut self, body: TestBody) {
        self.bodies[body.0].destroyed = true;
    }

    fn spawn_pivot_marker(&mut self, parent: TestBody, world_position: Vec3, size: f32) {
        self.markers.push((parent, world_position, size));
    }
}
