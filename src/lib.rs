//! modship - build, stage and deploy a native game-server extension
//!
//! Compiles the extension for a `(os, arch, profile)` target, assembles the mod
//! tree with its packed addons, replaces the deployment on a local or
//! ssh-reachable server host, restarts the server and follows its logs.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    CancellationToken, Collaborators, DeployContext, DeployOrchestrator, Interrupt, RunOutcome,
};
pub use config::Config;
pub use domain::value_objects::{Arch, BuildTarget, Os, Profile};
pub use error::{DeployError, DeployResult};
