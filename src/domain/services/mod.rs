//! Domain services - pure logic with no IO

pub mod target_resolver;

pub use target_resolver::{
    resolve, ArtifactInstall, NamingScheme, ResolvedTarget, TargetTable,
};
