use bevy::{
    app::{App, Plugin},
    asset::AssetApp,
};

use crate::{
    config::{
        AngleLimit, BoneAxis, BoxGroupConfig, JointKind, RagdollConfig, RagdollDefaults,
        RagdollSettings, loader::RagdollConfigLoader,
    },
    physics::BodyMode,
    sync::{RagdollMode, RagdollState},
};

/// Registers the ragdoll configuration asset and its loader. Engine-independent: does not add
/// any system.
pub struct BoxRagdollCorePlugin;

impl Plugin for BoxRagdollCorePlugin {
    fn build(&self, app: &mut App) {
        self.register_assets(app);
        self.register_types(app);
    }
}

impl BoxRagdollCorePlugin {
    fn register_assets(&self, app: &mut App) {
        app.init_asset::<RagdollConfig>()
            .init_asset_loader::<RagdollConfigLoader>()
            .register_asset_reflect::<RagdollConfig>();
    }

    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<RagdollDefaults>()
            .register_type::<RagdollSettings>()
            .register_type::<BoxGroupConfig>()
            .register_type::<BoneAxis>()
            .register_type::<JointKind>()
            .register_type::<AngleLimit>()
            .register_type::<BodyMode>()
            .register_type::<RagdollMode>()
            .register_type::<RagdollState>();
    }
}
