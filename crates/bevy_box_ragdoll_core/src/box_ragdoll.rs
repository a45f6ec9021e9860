use bevy::log::{info, warn};

use crate::{
    active_bone::{ActiveBoneId, ActiveBones},
    colliders::{CollidersReport, build_colliders},
    config::{RagdollConfig, RagdollSettings},
    errors::{BuildOrderError, RagdollResult},
    hierarchy::BoneHierarchy,
    joint_graph::{JointGraph, build_joint_graph},
    physics::RigidBodyBackend,
    root::resolve_root,
    sync::{RagdollMode, RagdollState, parent_first_order},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CollidersStatus {
    #[default]
    NotBuilt,
    /// Construction stopped at a configuration error. The colliders built before the error are
    /// kept but joints cannot be added.
    Partial,
    Built,
}

/// A ragdoll made of one box per configured bone, generic over the bone handle `B`, the body
/// handle `P` and the joint handle `J` of the adapters it is driven with.
///
/// Lifecycle: [`Self::build_colliders`], then [`Self::build_joints`] (or [`Self::init`] for both),
/// then [`Self::tick`] once per frame. [`Self::activate_simulation`] hands the bones over to the
/// physics engine.
#[derive(Debug, Clone)]
pub struct BoxRagdoll<B, P, J> {
    config: RagdollConfig,
    active_bones: ActiveBones<B, P>,
    colliders: CollidersStatus,
    joints: Option<JointGraph<J>>,
    /// Active bones, parents first. Filled together with the joint graph.
    sync_order: Vec<ActiveBoneId>,
    state: RagdollState,
}

impl<B, P, J> BoxRagdoll<B, P, J> {
    pub fn new(config: RagdollConfig) -> Self {
        Self {
            config,
            active_bones: ActiveBones::new(),
            colliders: CollidersStatus::NotBuilt,
            joints: None,
            sync_order: Vec::new(),
            state: RagdollState::default(),
        }
    }

    pub fn config(&self) -> &RagdollConfig {
        &self.config
    }

    pub fn settings(&self) -> &RagdollSettings {
        &self.config.settings
    }

    pub fn active_bones(&self) -> &ActiveBones<B, P> {
        &self.active_bones
    }

    pub fn joint_graph(&self) -> Option<&JointGraph<J>> {
        self.joints.as_ref()
    }

    pub fn root(&self) -> Option<ActiveBoneId> {
        self.joints.as_ref().map(|graph| graph.root)
    }

    pub fn state(&self) -> &RagdollState {
        &self.state
    }

    pub fn mode(&self) -> RagdollMode {
        self.state.mode
    }

    pub fn is_simulated(&self) -> bool {
        self.state.is_simulated()
    }

    /// Whether every configured bone got its collider.
    pub fn colliders_built(&self) -> bool {
        self.colliders == CollidersStatus::Built
    }

    pub fn joints_built(&self) -> bool {
        self.joints.is_some()
    }

    pub fn show_boxes(&self) -> bool {
        self.config.settings.show_boxes
    }

    /// Creates one box per configured bone.
    ///
    /// Can only be attempted once. When a bone cannot be resolved the boxes created so far are
    /// kept and the error is returned.
    pub fn build_colliders<H, R>(
        &mut self,
        hierarchy: &H,
        backend: &mut R,
    ) -> RagdollResult<CollidersReport>
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        if self.colliders != CollidersStatus::NotBuilt {
            return Err(BuildOrderError::CollidersAlreadyBuilt.into());
        }

        self.colliders = CollidersStatus::Partial;
        let report = build_colliders(&self.config, hierarchy, backend, &mut self.active_bones)?;
        self.colliders = CollidersStatus::Built;

        for warning in &report.warnings {
            warn!("Ragdoll collider built with a fallback: {warning:?}");
        }
        Ok(report)
    }

    /// Links every box to the box of its nearest active ancestor. Returns the number of joints.
    pub fn build_joints<H, R>(&mut self, hierarchy: &H, backend: &mut R) -> RagdollResult<usize>
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        if self.joints.is_some() {
            return Err(BuildOrderError::JointsAlreadyBuilt.into());
        }
        if !self.colliders_built() {
            return Err(BuildOrderError::CollidersNotBuilt.into());
        }

        let root = resolve_root(hierarchy, &self.active_bones)?;
        let graph = build_joint_graph(
            &self.config.settings,
            hierarchy,
            backend,
            &self.active_bones,
            root,
        )?;
        let joint_count = graph.len();

        self.sync_order = parent_first_order(hierarchy, &self.active_bones);
        self.joints = Some(graph);
        info!(
            "Ragdoll built with {} boxes and {joint_count} joints",
            self.active_bones.len()
        );
        Ok(joint_count)
    }

    /// Builds colliders and joints, stopping at the first error.
    pub fn init<H, R>(&mut self, hierarchy: &H, backend: &mut R) -> RagdollResult<CollidersReport>
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        let report = self.build_colliders(hierarchy, backend)?;
        self.build_joints(hierarchy, backend)?;
        Ok(report)
    }

    /// Runs one frame of synchronization. Does nothing until colliders exist.
    pub fn tick<H, R>(&mut self, hierarchy: &mut H, backend: &mut R)
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        match self.state.mode {
            RagdollMode::Kinematic => {
                if !self.config.settings.disable_box_bone_sync {
                    self.state
                        .follow_bones(hierarchy, backend, &self.active_bones);
                }
            }
            RagdollMode::Simulated => {
                if let Some(graph) = &self.joints {
                    self.state.follow_bodies(
                        hierarchy,
                        backend,
                        &self.active_bones,
                        graph.root,
                        &self.sync_order,
                    );
                }
            }
        }
    }

    /// Hands the bones over to the physics engine.
    ///
    /// Returns `Ok(false)` if the simulation was already active.
    pub fn activate_simulation<H, R>(
        &mut self,
        hierarchy: &H,
        backend: &mut R,
    ) -> RagdollResult<bool>
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        if self.joints.is_none() {
            return Err(BuildOrderError::JointsNotBuilt.into());
        }
        Ok(self.state.activate(hierarchy, backend, &self.active_bones))
    }

    /// Returns to kinematic follow. Returns `false` if the simulation was not active.
    pub fn deactivate_simulation<H, R>(&mut self, hierarchy: &mut H, backend: &mut R) -> bool
    where
        H: BoneHierarchy<Bone = B>,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        self.state
            .deactivate(hierarchy, backend, &self.active_bones)
    }

    /// Flips box visibility and returns the new value.
    pub fn toggle_show_boxes<R>(&mut self, backend: &mut R) -> bool
    where
        P: Copy,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        self.set_show_boxes(backend, !self.config.settings.show_boxes);
        self.config.settings.show_boxes
    }

    pub fn set_show_boxes<R>(&mut self, backend: &mut R, show: bool)
    where
        P: Copy,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        let settings = &mut self.config.settings;
        settings.show_boxes = show;
        let visibility = show.then_some(settings.box_visibility);
        for active in self.active_bones.iter() {
            backend.set_box_visibility(active.body, visibility);
        }
    }

    /// Destroys every joint and body and returns the ragdoll to its unbuilt state. The mesh keeps
    /// whatever correction was applied while simulating.
    pub fn dispose<R>(&mut self, backend: &mut R)
    where
        P: Copy,
        R: RigidBodyBackend<Body = P, Joint = J>,
    {
        if let Some(graph) = self.joints.take() {
            for edge in graph.edges {
                backend.destroy_joint(edge.joint);
            }
        }
        for active in self.active_bones.iter() {
            backend.destroy_body(active.body);
        }

        self.active_bones.clear();
        self.sync_order.clear();
        self.colliders = CollidersStatus::NotBuilt;
        self.state = RagdollState::default();
    }
}
