use avian3d::prelude::{
    AngularVelocity, Collider, FixedJoint, JointCollisionDisabled, LinearVelocity, Mass,
    Position, PrismaticJoint, Restitution, RevoluteJoint, RigidBody, Rotation, SphericalJoint,
};
use bevy::{
    ecs::system::SystemParam,
    platform::collections::HashMap,
    prelude::{
        Alpha, AlphaMode, Assets, ChildOf, Color, Commands, Cuboid, Entity, Handle, Mesh, Mesh3d,
        MeshMaterial3d, Name, Quat, Query, ResMut, Sphere, StandardMaterial, Transform, Vec3,
        Visibility, With,
    },
};
use bevy_box_ragdoll_core::{
    config::JointKind,
    physics::{BodyMode, BoxBodySpec, JointSpec, RigidBodyBackend},
};

use crate::rig::RagdollBox;

#[derive(SystemParam)]
pub struct AvianBodies<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub bodies: Query<
        'w,
        's,
        (
            &'static mut Position,
            &'static mut Rotation,
            &'static mut LinearVelocity,
            &'static mut AngularVelocity,
            &'static mut Visibility,
            &'static MeshMaterial3d<StandardMaterial>,
        ),
        With<RagdollBox>,
    >,
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
}

/// Box spawned this frame, not yet visible to the queries.
struct UnflushedBody {
    position: Vec3,
    rotation: Quat,
    material: Handle<StandardMaterial>,
}

/// [`RigidBodyBackend`] spawning box bodies and joints as avian entities.
pub struct AvianBackend<'a, 'w, 's> {
    params: &'a mut AvianBodies<'w, 's>,
    unflushed: HashMap<Entity, UnflushedBody>,
}

impl<'a, 'w, 's> AvianBackend<'a, 'w, 's> {
    pub fn new(params: &'a mut AvianBodies<'w, 's>) -> Self {
        Self {
            params,
            unflushed: HashMap::new(),
        }
    }

    fn material(&self, body: Entity) -> Option<Handle<StandardMaterial>> {
        if let Some(unflushed) = self.unflushed.get(&body) {
            return Some(unflushed.material.clone());
        }
        self.params
            .bodies
            .get(body)
            .ok()
            .map(|(.., material)| material.0.clone())
    }
}

fn rigid_body(mode: BodyMode) -> RigidBody {
    match mode {
        BodyMode::Kinematic => RigidBody::Kinematic,
        BodyMode::Dynamic => RigidBody::Dynamic,
    }
}

/// Ball-and-socket joint whose twist is measured around the configured rotation axis.
pub(crate) fn spherical_joint(parent: Entity, child: Entity, spec: &JointSpec) -> SphericalJoint {
    let twist_axis = spec.main_axis.normalize_or(Vec3::Y);
    SphericalJoint {
        twist_axis,
        swing_axis: twist_axis.any_orthonormal_vector(),
        ..SphericalJoint::new(parent, child)
            .with_local_anchor1(spec.main_pivot)
            .with_local_anchor2(spec.connected_pivot)
            .with_twist_limits(spec.limits.min, spec.limits.max)
    }
}

impl RigidBodyBackend for AvianBackend<'_, '_, '_> {
    type Body = Entity;
    type Joint = Entity;

    fn create_box_body(&mut self, spec: &BoxBodySpec) -> Entity {
        let dimensions = spec.dimensions;
        let mesh = self
            .params
            .meshes
            .add(Cuboid::new(dimensions.x, dimensions.y, dimensions.z));
        let material = self.params.materials.add(StandardMaterial {
            base_color: Color::WHITE,
            alpha_mode: AlphaMode::Blend,
            ..Default::default()
        });

        let body = self
            .params
            .commands
            .spawn((
                Name::new(format!("Ragdoll box {}", spec.bone_name)),
                RagdollBox {
                    bone: spec.bone_name.clone(),
                },
                Transform::from_translation(spec.position).with_rotation(spec.rotation),
                Position(spec.position),
                Rotation(spec.rotation),
                LinearVelocity(Vec3::ZERO),
                AngularVelocity(Vec3::ZERO),
                rigid_body(spec.mode),
                Collider::cuboid(dimensions.x, dimensions.y, dimensions.z),
                Mass(spec.mass),
                Restitution::new(spec.restitution),
                Mesh3d(mesh),
                MeshMaterial3d(material.clone()),
                Visibility::Hidden,
            ))
            .id();

        self.unflushed.insert(
            body,
            UnflushedBody {
                position: spec.position,
                rotation: spec.rotation,
                material,
            },
        );
        body
    }

    fn position(&self, body: Entity) -> Vec3 {
        if let Some(unflushed) = self.unflushed.get(&body) {
            return unflushed.position;
        }
        self.params
            .bodies
            .get(body)
            .map(|(position, ..)| position.0)
            .unwrap_or_default()
    }

    fn rotation(&self, body: Entity) -> Quat {
        if let Some(unflushed) = self.unflushed.get(&body) {
            return unflushed.rotation;
        }
        self.params
            .bodies
            .get(body)
            .map(|(_, rotation, ..)| rotation.0)
            .unwrap_or_default()
    }

    fn set_pose(&mut self, body: Entity, position: Vec3, rotation: Quat) {
        if let Some(unflushed) = self.unflushed.get_mut(&body) {
            unflushed.position = position;
            unflushed.rotation = rotation;
            self.params
                .commands
                .entity(body)
                .insert((Position(position), Rotation(rotation)));
            return;
        }
        if let Ok((mut body_position, mut body_rotation, ..)) = self.params.bodies.get_mut(body) {
            body_position.0 = position;
            body_rotation.0 = rotation;
        }
    }

    fn set_linear_velocity(&mut self, body: Entity, velocity: Vec3) {
        if self.unflushed.contains_key(&body) {
            self.params
                .commands
                .entity(body)
                .insert(LinearVelocity(velocity));
        } else if let Ok((_, _, mut linear, ..)) = self.params.bodies.get_mut(body) {
            linear.0 = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: Entity, velocity: Vec3) {
        if self.unflushed.contains_key(&body) {
            self.params
                .commands
                .entity(body)
                .insert(AngularVelocity(velocity));
        } else if let Ok((_, _, _, mut angular, ..)) = self.params.bodies.get_mut(body) {
            angular.0 = velocity;
        }
    }

    fn set_body_mode(&mut self, body: Entity, mode: BodyMode) {
        self.params.commands.entity(body).insert(rigid_body(mode));
    }

    fn set_box_visibility(&mut self, body: Entity, visibility: Option<f32>) {
        if let Some(alpha) = visibility
            && let Some(handle) = self.material(body)
            && let Some(material) = self.params.materials.get_mut(&handle)
        {
            material.base_color.set_alpha(alpha);
        }

        let visibility = match visibility {
            Some(_) => Visibility::Inherited,
            None => Visibility::Hidden,
        };
        if self.unflushed.contains_key(&body) {
            self.params.commands.entity(body).insert(visibility);
        } else if let Ok((.., mut body_visibility, _)) = self.params.bodies.get_mut(body) {
            *body_visibility = visibility;
        }
    }

    fn attach_joint(&mut self, parent: Entity, child: Entity, spec: &JointSpec) -> Entity {
        let limits = spec.limits;
        let mut joint = match spec.kind {
            JointKind::Hinge => self.params.commands.spawn(
                RevoluteJoint::new(parent, child)
                    .with_local_anchor1(spec.main_pivot)
                    .with_local_anchor2(spec.connected_pivot)
                    .with_hinge_axis(spec.main_axis)
                    .with_angle_limits(limits.min, limits.max),
            ),
            JointKind::BallAndSocket => self.params.commands.spawn(spherical_joint(parent, child, spec)),
            JointKind::Fixed => self.params.commands.spawn(
                FixedJoint::new(parent, child)
                    .with_local_anchor1(spec.main_pivot)
                    .with_local_anchor2(spec.connected_pivot),
            ),
            JointKind::Prismatic => self.params.commands.spawn(
                PrismaticJoint::new(parent, child)
                    .with_local_anchor1(spec.main_pivot)
                    .with_local_anchor2(spec.connected_pivot)
                    .with_slider_axis(spec.main_axis),
            ),
        };
        if !spec.collision {
            joint.insert(JointCollisionDisabled);
        }
        joint.id()
    }

    fn destroy_joint(&mut self, joint: Entity) {
        self.params.commands.entity(joint).try_despawn();
    }

    fn destroy_body(&mut self, body: Entity) {
        self.unflushed.remove(&body);
        self.params.commands.entity(body).try_despawn();
    }

    fn spawn_pivot_marker(&mut self, parent: Entity, world_position: Vec3, size: f32) {
        let local = self
            .world_matrix(parent)
            .inverse()
            .transform_point3(world_position);
        let mesh = self.params.meshes.add(Sphere::new(size));
        let material = self.params.materials.add(StandardMaterial {
            base_color: Color::srgb(1., 0., 0.),
            unlit: true,
            ..Default::default()
        });
        self.params.commands.spawn((
            Name::new("Ragdoll pivot"),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(local),
            ChildOf(parent),
        ));
    }
}
