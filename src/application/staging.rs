//! Staging Pipeline
//!
//! Rebuilds `<build_dir>/<mod_name>` from scratch on every invocation:
//!
//! 1. Remove the staged mod directory
//! 2. Recreate it from the static mod source tree
//! 3. Empty `addons/`
//! 4. Drop a stale extension log
//! 5. Compile the extension and install it under its target-specific name
//! 6. Pack every addon into `addons/<addon>.<archive_extension>`
//!
//! Any failure aborts the remaining steps. Nothing is rolled back.

use std::path::PathBuf;

use crate::domain::entities::{StagedTree, ADDONS_DIR};
use crate::domain::ports::{ArchivePacker, Compiler, DeployEventSink, ExecutionBackend};
use crate::domain::services::ArtifactInstall;
use crate::error::DeployResult;

use super::context::DeployContext;
use super::progress::step;

pub const STEP_CLEAN: &str = "Cleaning directories";
pub const STEP_COMPILE: &str = "Compiling extension";
pub const STEP_ADDONS: &str = "Building addons";

/// Produces a clean, reproducible staged mod tree on the build host
pub struct StagingPipeline<'a> {
    backend: &'a dyn ExecutionBackend,
    compiler: &'a dyn Compiler,
    packer: &'a dyn ArchivePacker,
    events: &'a dyn DeployEventSink,
}

impl<'a> StagingPipeline<'a> {
    pub fn new(
        backend: &'a dyn ExecutionBackend,
        compiler: &'a dyn Compiler,
        packer: &'a dyn ArchivePacker,
        events: &'a dyn DeployEventSink,
    ) -> Self {
        Self {
            backend,
            compiler,
            packer,
            events,
        }
    }

    pub fn stage(&self, ctx: &DeployContext) -> DeployResult<StagedTree> {
        let root = ctx.staged_root();
        let addons_dir = root.join(ADDONS_DIR);

        step(self.events, STEP_CLEAN, || {
            self.backend.remove_tree(&root)?;
            self.backend.make_dirs(&root)?;
            self.backend.copy_tree(&ctx.source_dir, &root)?;
            self.backend.remove_tree(&addons_dir)?;
            self.backend.make_dirs(&addons_dir)?;
            self.backend.remove_file(&root.join(&ctx.log_file))?;
            Ok(())
        })?;

        let binary = step(self.events, STEP_COMPILE, || {
            let artifact = self.compiler.compile(&ctx.resolved, ctx.build.profile)?;
            let binary = root.join(&ctx.resolved.binary_file_name);
            match ctx.resolved.install {
                ArtifactInstall::Move => self.backend.move_file(&artifact, &binary)?,
                ArtifactInstall::Copy => self.backend.copy_file(&artifact, &binary)?,
            }
            Ok(binary)
        })?;

        let archives = step(self.events, STEP_ADDONS, || {
            let sources = ctx.source_dir.join(ADDONS_DIR);
            ctx.addons
                .iter()
                .map(|addon| self.packer.pack(&sources.join(addon), addon, &addons_dir))
                .collect::<DeployResult<Vec<PathBuf>>>()
        })?;

        Ok(StagedTree::new(root, binary, archives))
    }
}
