use bevy::{
    app::{App, Plugin, PostUpdate},
    ecs::{
        intern::Interned,
        schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet},
    },
    transform::TransformSystems,
};
use bevy_box_ragdoll_core::plugin::BoxRagdollCorePlugin;

#[cfg(feature = "physics_avian")]
use crate::systems::{apply_rig_requests, build_pending_rigs, tick_rigs};
use crate::rig::{BoneLength, RagdollBox, RagdollRig};

/// Adds box ragdolls to an app. Bodies and joints are only spawned with the `physics_avian`
/// feature.
pub struct BoxRagdollPlugin {
    /// Schedule the ragdoll systems run in. Must run after the animation is applied and before
    /// transforms are propagated.
    pub schedule: Interned<dyn ScheduleLabel>,
}

impl Default for BoxRagdollPlugin {
    fn default() -> Self {
        Self {
            schedule: PostUpdate.intern(),
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum BoxRagdollSet {
    /// Spawns the bodies of rigs whose configuration is loaded.
    Build,
    /// Applies simulation requests and synchronizes bones with bodies.
    Sync,
}

impl Plugin for BoxRagdollPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(BoxRagdollCorePlugin);
        app.register_type::<BoneLength>()
            .register_type::<RagdollBox>();
        self.register_component_hooks(app);

        app.configure_sets(
            self.schedule,
            (BoxRagdollSet::Build, BoxRagdollSet::Sync)
                .chain()
                .before(TransformSystems::Propagate),
        );

        #[cfg(feature = "physics_avian")]
        {
            app.add_systems(self.schedule, build_pending_rigs.in_set(BoxRagdollSet::Build));
            app.add_systems(
                self.schedule,
                (apply_rig_requests, tick_rigs)
                    .chain()
                    .in_set(BoxRagdollSet::Sync),
            );
        }
    }
}

impl BoxRagdollPlugin {
    fn register_component_hooks(&self, app: &mut App) {
        app.world_mut()
            .register_component_hooks::<RagdollRig>()
            .on_replace(|mut world, context| {
                let spawned = world
                    .entity(context.entity)
                    .get::<RagdollRig>()
                    .map(RagdollRig::spawned_entities)
                    .unwrap_or_default();
                let mut commands = world.commands();
                for entity in spawned {
                    commands.entity(entity).try_despawn();
                }
            });
    }
}

