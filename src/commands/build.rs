//! Build command handler
//!
//! Compiles the extension and stages the mod tree; the server is not touched.

use anyhow::Result;

use modship::infrastructure::{CargoCompiler, LocalBackend};
use modship::{BuildTarget, CancellationToken, Collaborators, DeployOrchestrator};

use super::{finish, Finished, Session};
use crate::cli::Cli;

/// Execute the build command
pub fn cmd_build(cli: &Cli, color: bool, build: BuildTarget) -> Result<Finished> {
    let session = Session::open(cli, color, build)?;

    let local = LocalBackend::new();
    let compiler = CargoCompiler::new(session.root());
    let packer = session.packer();
    let tools = Collaborators {
        local: &local,
        target: &local,
        compiler: &compiler,
        packer: &packer,
        datastore: None,
        viewer: None,
    };

    let mut orchestrator =
        DeployOrchestrator::new(&session.ctx, tools, &session.events, CancellationToken::new());
    let result = orchestrator.build();
    if let Ok(staged) = &result {
        tracing::info!(
            root = %staged.root().display(),
            archives = staged.archives().len(),
            "mod staged"
        );
    }
    finish(&session, result)
}
