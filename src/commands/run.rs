//! Run command handler
//!
//! Full pipeline against the configured server host, then follows its logs
//! until interrupted.

use anyhow::Result;

use modship::infrastructure::{
    backend_for, CargoCompiler, CommandDatastoreReset, LocalBackend, ProgramLogViewer,
    RemoteSettings,
};
use modship::{BuildTarget, CancellationToken, Collaborators, DeployOrchestrator, RunOutcome};

use super::{finish, Finished, Session};
use crate::cli::Cli;

/// Execute the run command
pub fn cmd_run(
    cli: &Cli,
    color: bool,
    build: BuildTarget,
    cancel: CancellationToken,
) -> Result<Finished> {
    let session = Session::open(cli, color, build)?;
    let deploy = &session.config.deploy;

    let local = LocalBackend::new();
    let target = backend_for(
        &session.ctx.deployment,
        &RemoteSettings {
            ssh_program: deploy.ssh_program.clone(),
            scp_program: deploy.scp_program.clone(),
            ssh_options: deploy.ssh_options.clone(),
        },
    );
    tracing::debug!(backend = %target.describe(), "deployment backend selected");

    let compiler = CargoCompiler::new(session.root());
    let packer = session.packer();
    let datastore =
        CommandDatastoreReset::from_argv(&session.config.tools.datastore_reset, session.root());
    let viewer = ProgramLogViewer::new(session.ctx.logs.viewer.clone());

    let tools = Collaborators {
        local: &local,
        target: target.as_ref(),
        compiler: &compiler,
        packer: &packer,
        datastore: datastore
            .as_ref()
            .map(|d| d as &dyn modship::domain::ports::DatastoreReset),
        viewer: Some(&viewer),
    };

    let mut orchestrator = DeployOrchestrator::new(&session.ctx, tools, &session.events, cancel);
    let result = orchestrator.run();
    if let Ok(RunOutcome::LogTimedOut { what, attempts }) = &result {
        tracing::warn!(%what, attempts, "log never appeared");
    }
    finish(&session, result)
}
