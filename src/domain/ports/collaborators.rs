//! Collaborator ports - the external tools the pipeline drives
//!
//! Each is a single external command in production; tests substitute
//! in-process fakes.

use std::path::{Path, PathBuf};

use crate::domain::services::ResolvedTarget;
use crate::domain::value_objects::Profile;
use crate::error::DeployResult;

/// Compiles the native extension
pub trait Compiler {
    /// Build for the resolved target and return the path of the produced artifact
    fn compile(&self, target: &ResolvedTarget, profile: Profile) -> DeployResult<PathBuf>;
}

/// Packs one addon source directory into an archive
pub trait ArchivePacker {
    /// Pack `source_dir` as `addon` into `dest_dir`, returning the archive path
    fn pack(&self, source_dir: &Path, addon: &str, dest_dir: &Path) -> DeployResult<PathBuf>;
}

/// Replaces the server datastore with fresh fixture data
pub trait DatastoreReset {
    fn reset(&self) -> DeployResult<()>;
}

/// Opens a file for the operator (editor, viewer, ...)
pub trait LogViewer {
    fn open(&self, path: &Path) -> DeployResult<()>;
}
