//! Engine-independent core of the box ragdoll builder.
//!
//! A [`BoxRagdoll`](box_ragdoll::BoxRagdoll) is driven through two adapter traits:
//! [`BoneHierarchy`](hierarchy::BoneHierarchy) for the animated skeleton and
//! [`RigidBodyBackend`](physics::RigidBodyBackend) for the physics engine.

pub mod active_bone;
pub mod box_ragdoll;
pub mod colliders;
pub mod config;
pub mod errors;
pub mod hierarchy;
pub mod joint_graph;
pub mod physics;
pub mod plugin;
pub mod root;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub mod prelude {
    pub use super::active_bone::{ActiveBone, ActiveBoneId, ActiveBones};
    pub use super::box_ragdoll::BoxRagdoll;
    pub use super::colliders::CollidersReport;
    pub use super::config::{
        AngleLimit, BoneAxis, BoxGroupConfig, JointKind, RagdollConfig, RagdollDefaults,
        RagdollSettings, descriptor::BoxDescriptor, loader::RagdollConfigLoader,
    };
    pub use super::errors::{
        BuildOrderError, ConfigError, ConfigWarning, RagdollBuildError, RagdollResult,
        TopologyError,
    };
    pub use super::hierarchy::BoneHierarchy;
    pub use super::joint_graph::{JointEdge, JointGraph};
    pub use super::physics::{BodyMode, BoxBodySpec, JointSpec, RigidBodyBackend};
    pub use super::plugin::BoxRagdollCorePlugin;
    pub use super::sync::{RagdollMode, RagdollState, sync_body_with_bone};
}
