//! Value objects - immutable values shared by every component

mod build_target;
mod deployment_target;

pub use build_target::{Arch, BuildTarget, Os, Profile};
pub use deployment_target::{DeploymentMode, DeploymentTarget};
