use bevy::{
    asset::Assets,
    ecs::{entity::Entity, system::{Query, Res}},
    log::{error, warn},
};
use bevy_box_ragdoll_core::{box_ragdoll::BoxRagdoll, config::RagdollConfig};

use crate::{
    physics_avian::{AvianBackend, AvianBodies},
    rig::{RagdollRig, RigStatus},
    skeleton::{RigSkeleton, SkeletonQueries},
};

/// Builds the ragdoll of every rig whose configuration finished loading.
pub fn build_pending_rigs(
    mut rigs: Query<(Entity, &mut RagdollRig)>,
    configs: Res<Assets<RagdollConfig>>,
    mut skeleton_queries: SkeletonQueries,
    mut bodies: AvianBodies,
) {
    for (entity, mut rig) in &mut rigs {
        if rig.status != RigStatus::Pending {
            continue;
        }
        let Some(config) = configs.get(&rig.config) else {
            continue;
        };

        let skeleton = RigSkeleton::new(&mut skeleton_queries, entity, rig.skeleton_root);
        let mut backend = AvianBackend::new(&mut bodies);
        let mut ragdoll = BoxRagdoll::new(config.clone());

        rig.status = match ragdoll.init(&skeleton, &mut backend) {
            Ok(report) => {
                for warning in report.warnings {
                    warn!("Ragdoll rig {entity}: {warning:?}");
                }
                RigStatus::Ready
            }
            Err(err) => {
                error!("Ragdoll rig {entity} could not be completed: {err}");
                RigStatus::Failed(err)
            }
        };
        rig.ragdoll = Some(ragdoll);
    }
}

/// Applies the `simulate` and `show_boxes` requests of every built rig.
pub fn apply_rig_requests(
    mut rigs: Query<(Entity, &mut RagdollRig)>,
    mut skeleton_queries: SkeletonQueries,
    mut bodies: AvianBodies,
) {
    for (entity, mut rig) in &mut rigs {
        let rig = &mut *rig;
        let Some(ragdoll) = rig.ragdoll.as_mut() else {
            continue;
        };
        let mut skeleton = RigSkeleton::new(&mut skeleton_queries, entity, rig.skeleton_root);
        let mut backend = AvianBackend::new(&mut bodies);

        if let Some(show) = rig.show_boxes
            && show != ragdoll.show_boxes()
        {
            ragdoll.set_show_boxes(&mut backend, show);
        }

        if rig.simulate && !ragdoll.is_simulated() {
            if let Err(err) = ragdoll.activate_simulation(&skeleton, &mut backend) {
                warn!("Ragdoll rig {entity} cannot simulate: {err}");
                rig.simulate = false;
            }
        } else if !rig.simulate && ragdoll.is_simulated() {
            ragdoll.deactivate_simulation(&mut skeleton, &mut backend);
        }
    }
}

pub fn tick_rigs(
    mut rigs: Query<(Entity, &mut RagdollRig)>,
    mut skeleton_queries: SkeletonQueries,
    mut bodies: AvianBodies,
) {
    for (entity, mut rig) in &mut rigs {
        let skeleton_root = rig.skeleton_root;
        let Some(ragdoll) = rig.ragdoll.as_mut() else {
            continue;
        };
        let mut skeleton = RigSkeleton::new(&mut skeleton_queries, entity, skeleton_root);
        let mut backend = AvianBackend::new(&mut bodies);
        ragdoll.tick(&mut skeleton, &mut backend);
    }
}
