use bevy::{
    asset::Handle,
    ecs::{component::Component, entity::Entity},
    reflect::Reflect,
};
use bevy_box_ragdoll_core::{
    box_ragdoll::BoxRagdoll, config::RagdollConfig, errors::RagdollBuildError,
};

/// Ragdoll whose bones, bodies and joints are all entities.
pub type EntityRagdoll = BoxRagdoll<Entity, Entity, Entity>;

/// Turns the skeleton under `skeleton_root` into a box ragdoll. Goes on the character entity,
/// whose translation absorbs the root correction while simulating.
#[derive(Component, Debug)]
pub struct RagdollRig {
    pub config: Handle<RagdollConfig>,
    /// Entity whose children are the top-level bones of the skeleton.
    pub skeleton_root: Entity,
    /// Requested simulation state. Ignored until the joints are built.
    pub simulate: bool,
    /// Requested box visibility. `None` keeps the configured value.
    pub show_boxes: Option<bool>,
    pub(crate) status: RigStatus,
    pub(crate) ragdoll: Option<EntityRagdoll>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RigStatus {
    /// Waiting for the configuration asset.
    #[default]
    Pending,
    Ready,
    /// Construction stopped early. Whatever colliders were built still follow the bones.
    Failed(RagdollBuildError),
}

impl RagdollRig {
    pub fn new(config: Handle<RagdollConfig>, skeleton_root: Entity) -> Self {
        Self {
            config,
            skeleton_root,
            simulate: false,
            show_boxes: None,
            status: RigStatus::Pending,
            ragdoll: None,
        }
    }

    pub fn status(&self) -> &RigStatus {
        &self.status
    }

    pub fn ragdoll(&self) -> Option<&EntityRagdoll> {
        self.ragdoll.as_ref()
    }

    pub fn is_simulated(&self) -> bool {
        self.ragdoll.as_ref().is_some_and(EntityRagdoll::is_simulated)
    }

    /// Body and joint entities owned by this rig.
    pub fn spawned_entities(&self) -> Vec<Entity> {
        let Some(ragdoll) = &self.ragdoll else {
            return Vec::new();
        };
        let joints = ragdoll
            .joint_graph()
            .into_iter()
            .flat_map(|graph| graph.edges.iter().map(|edge| edge.joint));
        let bodies = ragdoll.active_bones().iter().map(|active| active.body);
        joints.chain(bodies).collect()
    }
}

/// Length of the bone on this entity, used to center boxes on their bone.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BoneLength(pub f32);

/// Marks the rigid body entity spawned for a bone.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq)]
pub struct RagdollBox {
    pub bone: String,
}
