use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};

use super::RagdollConfig;
use crate::errors::AssetLoaderError;

/// Loads `*.boxrag.ron` files into [`RagdollConfig`] assets.
#[derive(Default, TypePath)]
pub struct RagdollConfigLoader;

impl AssetLoader for RagdollConfigLoader {
    type Asset = RagdollConfig;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let config: RagdollConfig = ron::de::from_bytes(&bytes)?;
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &["boxrag.ron"]
    }
}
