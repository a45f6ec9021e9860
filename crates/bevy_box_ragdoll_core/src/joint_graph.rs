//! Links colliders into a tree of joints that mirrors the skeleton with bones lacking a collider
//! left out.

use bevy::{
    log::{debug, error},
    math::Vec3,
};

use crate::{
    active_bone::{ActiveBoneId, ActiveBones},
    config::RagdollSettings,
    errors::TopologyError,
    hierarchy::BoneHierarchy,
    physics::{JointSpec, RigidBodyBackend},
};

#[derive(Debug, Clone, PartialEq)]
pub struct JointEdge<J> {
    pub child: ActiveBoneId,
    /// Nearest ancestor of `child` that has a collider.
    pub parent: ActiveBoneId,
    /// Child bone position in the parent box's local frame.
    pub main_pivot: Vec3,
    /// Child bone position relative to the child box.
    pub connected_pivot: Vec3,
    pub joint: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointGraph<J> {
    pub root: ActiveBoneId,
    /// One edge per active bone except the root, in handle order.
    pub edges: Vec<JointEdge<J>>,
}

impl<J> JointGraph<J> {
    pub fn edge(&self, child: ActiveBoneId) -> Option<&JointEdge<J>> {
        self.edges.iter().find(|edge| edge.child == child)
    }

    pub fn parent_of(&self, child: ActiveBoneId) -> Option<ActiveBoneId> {
        self.edge(child).map(|edge| edge.parent)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Walks up the raw skeleton from `bone` and returns the first ancestor that has a collider.
pub fn nearest_active_ancestor<H: BoneHierarchy, P>(
    hierarchy: &H,
    active_bones: &ActiveBones<H::Bone, P>,
    bone: H::Bone,
) -> Option<ActiveBoneId> {
    let mut current = hierarchy.parent(bone);
    while let Some(ancestor) = current {
        if let Some(id) = active_bones.id_of(&hierarchy.bone_name(ancestor)) {
            return Some(id);
        }
        current = hierarchy.parent(ancestor);
    }
    None
}

/// Creates a joint between every non-root active bone and its nearest active ancestor.
///
/// Every ancestor is looked up before any joint is created, so a failure leaves the backend
/// untouched.
pub fn build_joint_graph<H, P>(
    settings: &RagdollSettings,
    hierarchy: &H,
    backend: &mut P,
    active_bones: &ActiveBones<H::Bone, P::Body>,
    root: ActiveBoneId,
) -> Result<JointGraph<P::Joint>, TopologyError>
where
    H: BoneHierarchy,
    P: RigidBodyBackend,
{
    let links = active_bones
        .iter()
        .filter(|active| active.id != root)
        .map(|active| {
            nearest_active_ancestor(hierarchy, active_bones, active.bone)
                .map(|parent| (active.id, parent))
                .ok_or_else(|| {
                    let err = TopologyError::NoActiveAncestor(active.name.clone());
                    error!("Ragdoll joint creation failed: {err}");
                    err
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut edges = Vec::with_capacity(links.len());

    for (child_id, parent_id) in links {
        let (Some(child), Some(parent)) = (active_bones.get(child_id), active_bones.get(parent_id))
        else {
            continue;
        };

        let bone_position = hierarchy.world_position(child.bone);
        let main_pivot = backend
            .world_matrix(parent.body)
            .inverse()
            .transform_point3(bone_position);
        let connected_pivot = bone_position - backend.position(child.body);

        let axis = child.descriptor.rotation_axis.to_vec3();
        let spec = JointSpec {
            kind: child.descriptor.joint,
            main_pivot,
            connected_pivot,
            main_axis: axis,
            connected_axis: axis,
            collision: settings.joint_collisions,
            limits: child.descriptor.joint_limits.to_radians(),
        };
        let joint = backend.attach_joint(parent.body, child.body, &spec);
        debug!("Linked {:?} to its nearest parent {:?}", child.name, parent.name);

        if settings.pivot_marker_size > 0. {
            backend.spawn_pivot_marker(parent.body, bone_position, settings.pivot_marker_size);
        }

        edges.push(JointEdge {
            child: child_id,
            parent: parent_id,
            main_pivot,
            connected_pivot,
            joint,
        });
    }

    Ok(JointGraph { root, edges })
}

#[cfg(test)]
mod tests {
    use bevy::math::Quat;

    use super::*;
    use crate::{
        colliders::build_colliders,
        config::{AngleLimit, BoneAxis, BoxGroupConfig, JointKind, RagdollConfig},
        root::resolve_root,
        test_support::{TestBody, TestPhysics, TestSkeleton},
    };

    /// Hips -> Spine -> Chest -> {Neck -> Head, UpperArm -> LowerArm -> Hand}
    fn humanoid() -> TestSkeleton {
        let mut skeleton = TestSkeleton::new();
        let hips = skeleton.add_root("Hips", Vec3::new(0., 1., 0.));
        let spine = skeleton.add_bone("Spine", hips, Vec3::new(0., 0.2, 0.));
        let chest = skeleton.add_bone("Chest", spine, Vec3::new(0., 0.2, 0.));
        let neck = skeleton.add_bone("Neck", chest, Vec3::new(0., 0.2, 0.));
        skeleton.add_bone("Head", neck, Vec3::new(0., 0.1, 0.));
        let upper_arm = skeleton.add_bone("UpperArm", chest, Vec3::new(0.2, 0., 0.));
        let lower_arm = skeleton.add_bone("LowerArm", upper_arm, Vec3::new(0.3, 0., 0.));
        skeleton.add_bone("Hand", lower_arm, Vec3::new(0.25, 0., 0.));
        skeleton
    }

    fn build(
        skeleton: &TestSkeleton,
        config: &RagdollConfig,
    ) -> (
        TestPhysics,
        ActiveBones<crate::test_support::TestBone, TestBody>,
        JointGraph<crate::test_support::TestJoint>,
    ) {
        let mut physics = TestPhysics::new();
        let mut bones = ActiveBones::new();
        build_colliders(config, skeleton, &mut physics, &mut bones).unwrap();
        let root = resolve_root(skeleton, &bones).unwrap();
        let graph =
            build_joint_graph(&config.settings, skeleton, &mut physics, &bones, root).unwrap();
        (physics, bones, graph)
    }

    #[test]
    fn inactive_bones_are_skipped() {
        let mut skeleton = TestSkeleton::new();
        let root = skeleton.add_root("Root", Vec3::ZERO);
        let spine = skeleton.add_bone("Spine", root, Vec3::Y);
        skeleton.add_bone("Head", spine, Vec3::Y);
        let config = RagdollConfig::new(vec![BoxGroupConfig::for_bones(["Root", "Head"])]);

        let (physics, bones, graph) = build(&skeleton, &config);

        assert_eq!(graph.len(), 1);
        let head = bones.id_of("Head").unwrap();
        let root = bones.id_of("Root").unwrap();
        assert_eq!(graph.root, root);
        assert_eq!(graph.parent_of(head), Some(root));
        assert_eq!(physics.joints.len(), 1);
        assert_eq!(physics.joints[0].parent, bones.get(root).unwrap().body);
        assert_eq!(physics.joints[0].child, bones.get(head).unwrap().body);
    }

    #[test]
    fn every_non_root_bone_gets_one_edge() {
        let skeleton = humanoid();
        let config = RagdollConfig::new(vec![
            BoxGroupConfig::for_bones(["Head", "Hand"]),
            BoxGroupConfig::for_bones(["Hips", "Chest", "UpperArm"]),
        ]);

        let (_, bones, graph) = build(&skeleton, &config);

        assert_eq!(graph.len(), bones.len() - 1);
        assert!(graph.edge(graph.root).is_none());
        for id in bones.ids().filter(|id| *id != graph.root) {
            // Following parents always ends at the root
            let mut current = id;
            let mut steps = 0;
            while let Some(parent) = graph.parent_of(current) {
                current = parent;
                steps += 1;
                assert!(steps <= bones.len());
            }
            assert_eq!(current, graph.root);
        }
    }

    #[test]
    fn nearest_ancestor_is_the_closest_active_one() {
        let skeleton = humanoid();
        let config = RagdollConfig::new(vec![BoxGroupConfig::for_bones([
            "Hips", "Spine", "Chest", "Hand",
        ])]);
        let mut physics = TestPhysics::new();
        let mut bones = ActiveBones::new();
        build_colliders(&config, &skeleton, &mut physics, &mut bones).unwrap();

        let hand = skeleton.find_bone("Hand").unwrap();
        let head = skeleton.find_bone("Head").unwrap();
        let spine = skeleton.find_bone("Spine").unwrap();

        assert_eq!(
            nearest_active_ancestor(&skeleton, &bones, hand),
            bones.id_of("Chest")
        );
        assert_eq!(
            nearest_active_ancestor(&skeleton, &bones, head),
            bones.id_of("Chest")
        );
        assert_eq!(
            nearest_active_ancestor(&skeleton, &bones, spine),
            bones.id_of("Hips")
        );
        let hips = skeleton.find_bone("Hips").unwrap();
        assert_eq!(nearest_active_ancestor(&skeleton, &bones, hips), None);
    }

    #[test]
    fn pivots_are_local_to_each_box() {
        let mut skeleton = TestSkeleton::new();
        let root = skeleton.add_root("Root", Vec3::new(0., 1., 0.));
        skeleton.add_bone("Head", root, Vec3::new(0., 1., 0.));
        let config = RagdollConfig::new(vec![
            BoxGroupConfig {
                box_offset: Some(0.5),
                ..BoxGroupConfig::for_bone("Root")
            },
            BoxGroupConfig {
                box_offset: Some(0.25),
                ..BoxGroupConfig::for_bone("Head")
            },
        ]);

        let (_, _, graph) = build(&skeleton, &config);

        let edge = &graph.edges[0];
        // Head bone at (0, 2, 0), root box at (0, 1.5, 0), head box at (0, 2.25, 0)
        assert!(edge.main_pivot.abs_diff_eq(Vec3::new(0., 0.5, 0.), 1e-6));
        assert!(edge.connected_pivot.abs_diff_eq(Vec3::new(0., -0.25, 0.), 1e-6));
    }

    #[test]
    fn main_pivot_accounts_for_parent_box_rotation() {
        let mut skeleton = TestSkeleton::new();
        let root = skeleton.add_root("Root", Vec3::ZERO);
        skeleton.add_bone("Head", root, Vec3::new(1., 0., 0.));
        let config = RagdollConfig::new(vec![BoxGroupConfig::for_bones(["Root", "Head"])]);
        let mut physics = TestPhysics::new();
        let mut bones = ActiveBones::new();
        build_colliders(&config, &skeleton, &mut physics, &mut bones).unwrap();
        let root_body = bones.get_by_name("Root").unwrap().body;
        physics.body_mut(root_body).rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let root_id = resolve_root(&skeleton, &bones).unwrap();

        let graph =
            build_joint_graph(&config.settings, &skeleton, &mut physics, &bones, root_id).unwrap();

        // World +x is the rotated box's local -y
        assert!(
            graph.edges[0]
                .main_pivot
                .abs_diff_eq(Vec3::new(0., -1., 0.), 1e-5)
        );
    }

    #[test]
    fn joint_spec_uses_child_descriptor() {
        let mut skeleton = TestSkeleton::new();
        let root = skeleton.add_root("Root", Vec3::ZERO);
        skeleton.add_bone("Head", root, Vec3::Y);
        let mut config = RagdollConfig::new(vec![
            BoxGroupConfig::for_bone("Root"),
            BoxGroupConfig {
                joint: Some(JointKind::BallAndSocket),
                rotation_axis: Some(BoneAxis::Z),
                min: Some(-30.),
                max: Some(60.),
                ..BoxGroupConfig::for_bone("Head")
            },
        ]);
        config.settings.joint_collisions = true;

        let (physics, _, _) = build(&skeleton, &config);

        let spec = &physics.joints[0].spec;
        assert_eq!(spec.kind, JointKind::BallAndSocket);
        assert_eq!(spec.main_axis, Vec3::Z);
        assert_eq!(spec.connected_axis, Vec3::Z);
        assert!(spec.collision);
        assert_eq!(spec.limits, AngleLimit::new(-30., 60.).to_radians());
    }

    #[test]
    fn pivot_markers_only_when_configured() {
        let mut skeleton = TestSkeleton::new();
        let root = skeleton.add_root("Root", Vec3::ZERO);
        skeleton.add_bone("Head", root, Vec3::Y);
        let mut config = RagdollConfig::new(vec![BoxGroupConfig::for_bones(["Root", "Head"])]);

        let (physics, _, _) = build(&skeleton, &config);
        assert!(physics.markers.is_empty());

        config.settings.pivot_marker_size = 0.05;
        let (physics, bones, _) = build(&skeleton, &config);
        let root_body = bones.get_by_name("Root").unwrap().body;
        assert_eq!(physics.markers, vec![(root_body, Vec3::Y, 0.05)]);
    }
}
