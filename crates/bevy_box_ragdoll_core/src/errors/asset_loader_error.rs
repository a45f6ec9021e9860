use thiserror::Error;

/// Possible errors that can be produced by the ragdoll configuration loader
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    #[error("could not read ragdoll configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
}
