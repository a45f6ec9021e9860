use thiserror::Error;

/// The configuration names bones that cannot be turned into colliders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bone {0:?} does not exist in the skeleton")]
    MissingBone(String),
    #[error("bone {0:?} is configured more than once")]
    DuplicateBone(String),
}

/// The skeleton shape does not allow building a joint graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("the skeleton has no top-level bone")]
    NoSkeletonRoot,
    #[error("the skeleton has {0} top-level bones, but a ragdoll needs exactly one")]
    MultipleSkeletonRoots(usize),
    #[error("the skeleton root {0:?} has no collider")]
    RootNotActive(String),
    #[error("bone {0:?} has no ancestor with a collider")]
    NoActiveAncestor(String),
}

/// A ragdoll command was issued at the wrong point of the ragdoll's lifecycle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildOrderError {
    #[error("colliders have not been built, or their construction failed")]
    CollidersNotBuilt,
    #[error("colliders have already been built")]
    CollidersAlreadyBuilt,
    #[error("the joint graph has not been built")]
    JointsNotBuilt,
    #[error("the joint graph has already been built")]
    JointsAlreadyBuilt,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RagdollBuildError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
    #[error("{0}")]
    BuildOrder(#[from] BuildOrderError),
}

/// Non-fatal problem found while resolving the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Center placement was requested for a bone without length metadata; the box was placed at
    /// the bone origin instead.
    MissingBoneLength(String),
}

pub type RagdollResult<T> = Result<T, RagdollBuildError>;
