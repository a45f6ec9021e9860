mod asset_loader_error;
mod build_error;

pub use asset_loader_error::*;
pub use build_error::*;
