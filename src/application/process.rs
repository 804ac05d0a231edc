//! Process Controller
//!
//! Stops and starts the game server by name. No PID is tracked, so two
//! processes with the same name cannot be told apart.

use crate::domain::ports::{CommandSpec, ExecutionBackend};
use crate::domain::value_objects::Os;
use crate::error::{DeployError, DeployResult};

use super::context::DeployContext;

/// `taskkill` exit status when no process matched
const TASKKILL_NOT_FOUND: i32 = 128;
/// `killall` exit status when no process matched
const KILLALL_NOT_FOUND: i32 = 1;

/// Whether `stop` found something to kill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Server lifecycle on the deployment host
pub struct ProcessController<'a> {
    backend: &'a dyn ExecutionBackend,
}

impl<'a> ProcessController<'a> {
    pub fn new(backend: &'a dyn ExecutionBackend) -> Self {
        Self { backend }
    }

    /// The forceful terminate command for this target
    pub fn stop_command(ctx: &DeployContext) -> CommandSpec {
        let process = ctx.resolved.process_name.as_str();
        match ctx.build.os {
            Os::Windows => CommandSpec::new("taskkill").args(["/IM", process, "/F"]),
            Os::Linux => CommandSpec::new("killall").arg(process),
        }
    }

    /// Kill the server; succeeds when nothing is running
    pub fn stop(&self, ctx: &DeployContext) -> DeployResult<StopOutcome> {
        let command = Self::stop_command(ctx);
        let output = self.backend.run(&command)?;
        let not_found = match ctx.build.os {
            Os::Windows => TASKKILL_NOT_FOUND,
            Os::Linux => KILLALL_NOT_FOUND,
        };

        match output.status {
            Some(0) => Ok(StopOutcome::Stopped),
            Some(code) if code == not_found => {
                tracing::debug!(process = %ctx.resolved.process_name, "server was not running");
                Ok(StopOutcome::NotRunning)
            }
            status => Err(DeployError::ExternalCommand {
                command: command.to_string(),
                status,
                output: output.combined(),
            }),
        }
    }

    /// Launch the server through its start script
    ///
    /// On linux the server root is first cleared of stale mod directories and
    /// refilled from the deployed tree; that order matters.
    pub fn start(&self, ctx: &DeployContext) -> DeployResult<()> {
        let script = ctx.resolved.launch_script_name.as_str();
        match ctx.build.os {
            Os::Windows => {
                let command = CommandSpec::new("cmd")
                    .args(["/C", "start", "", script])
                    .current_dir(&ctx.launch_dir);
                self.backend.spawn_detached(&command)?;
            }
            Os::Linux => {
                for stale in &ctx.stale_paths {
                    self.backend.remove_tree(&ctx.server_path.join(stale))?;
                }
                self.backend.copy_tree(ctx.deployment.root_path(), &ctx.server_path)?;
                let command =
                    CommandSpec::new(format!("./{}", script)).current_dir(&ctx.launch_dir);
                self.backend.run_checked(&command)?;
            }
        }
        Ok(())
    }
}
