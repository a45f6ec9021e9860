//! # Bevy Box Ragdoll
//!
//! Builds a ragdoll out of box colliders for an animated skeleton. A box is attached to each bone
//! named in a `*.boxrag.ron` configuration, boxes are linked with joints that skip bones without a
//! box, and every frame either the boxes follow the animation or the bones follow the simulated
//! boxes.
//!
//! ```ron
//! (
//!     defaults: (joint: BallAndSocket, joint_limits: (min: -45.0, max: 45.0)),
//!     settings: (show_boxes: true),
//!     groups: [
//!         (bone: Some("Hips"), width: Some(0.3), height: Some(0.2), depth: Some(0.2)),
//!         (bones: ["Spine", "Chest"], size: Some(0.25), box_offset: Some(0.1)),
//!         (bone: Some("Head"), size: Some(0.2), put_box_in_bone_center: true),
//!     ],
//! )
//! ```
//!
//! Add [`BoxRagdollPlugin`](plugin::BoxRagdollPlugin) and insert a
//! [`RagdollRig`](rig::RagdollRig) on the character entity:
//!
//! ```ignore
//! commands.entity(character).insert(RagdollRig::new(
//!     asset_server.load("ragdolls/human.boxrag.ron"),
//!     armature,
//! ));
//! ```
//!
//! Setting `RagdollRig::simulate` hands the bones over to the physics engine; clearing it returns
//! them to the animation. Rigid bodies are provided by avian through the `physics_avian` feature.

#[cfg(feature = "physics_avian")]
pub mod physics_avian;
pub mod plugin;
pub mod rig;
pub mod skeleton;
#[cfg(feature = "physics_avian")]
pub mod systems;

pub mod prelude {
    pub use bevy_box_ragdoll_core::prelude::*;
    pub use super::plugin::{BoxRagdollPlugin, BoxRagdollSet};
    pub use super::rig::{BoneLength, EntityRagdoll, RagdollBox, RagdollRig, RigStatus};
    pub use super::skeleton::{RigSkeleton, SkeletonQueries};
}
