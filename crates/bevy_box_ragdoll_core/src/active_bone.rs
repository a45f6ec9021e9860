use bevy::math::Quat;
use bevy_box_ragdoll_proc_macros::IndexHandle;
use indexmap::IndexMap;

use crate::{config::descriptor::BoxDescriptor, errors::ConfigError};

/// Stable handle of a bone with a collider. Handles are issued in collider build order and never
/// reused while the ragdoll lives.
#[derive(IndexHandle, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActiveBoneId(#[index] u32);

/// A skeleton bone that owns a collider and takes part in the joint graph.
#[derive(Debug, Clone)]
pub struct ActiveBone<B, P> {
    pub id: ActiveBoneId,
    pub bone: B,
    pub name: String,
    pub body: P,
    pub descriptor: BoxDescriptor,
    /// World rotation of the bone when its collider was created. Reference frame for the
    /// rotation deltas applied while simulating.
    pub initial_rotation: Quat,
}

/// Arena of active bones, keyed by bone name and indexed by [`ActiveBoneId`].
#[derive(Debug, Clone)]
pub struct ActiveBones<B, P> {
    bones: IndexMap<String, ActiveBone<B, P>>,
}

impl<B, P> Default for ActiveBones<B, P> {
    fn default() -> Self {
        Self {
            bones: IndexMap::new(),
        }
    }
}

impl<B, P> ActiveBones<B, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: String,
        bone: B,
        body: P,
        descriptor: BoxDescriptor,
        initial_rotation: Quat,
    ) -> Result<ActiveBoneId, ConfigError> {
        if self.bones.contains_key(&name) {
            return Err(ConfigError::DuplicateBone(name));
        }
        let id = ActiveBoneId::from_index(self.bones.len());
        self.bones.insert(
            name.clone(),
            ActiveBone {
                id,
                bone,
                name,
                body,
                descriptor,
                initial_rotation,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: ActiveBoneId) -> Option<&ActiveBone<B, P>> {
        self.bones.get_index(id.index()).map(|(_, bone)| bone)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ActiveBone<B, P>> {
        self.bones.get(name)
    }

    pub fn id_of(&self, name: &str) -> Option<ActiveBoneId> {
        self.bones.get_index_of(name).map(ActiveBoneId::from_index)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Iterates in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveBone<B, P>> {
        self.bones.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActiveBoneId> + use<B, P> {
        (0..self.bones.len()).map(ActiveBoneId::from_index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.bones.clear();
    }
}
