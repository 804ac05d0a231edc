//! Subprocess plumbing shared by both backends

use std::process::{Command, Output, Stdio};

use crate::domain::ports::{BackendError, BackendResult, CommandOutput};

/// Run `cmd` to completion with stdin closed and both streams captured
pub(crate) fn capture(mut cmd: Command, shown: &str) -> BackendResult<CommandOutput> {
    tracing::debug!(command = %shown, "running");
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| BackendError::Spawn {
            program: program_name(&cmd),
            source,
        })?;
    let output = to_command_output(output);
    tracing::debug!(command = %shown, status = ?output.status, "finished");
    Ok(output)
}

/// Start `cmd` without waiting; all streams go to the null device
pub(crate) fn spawn_quiet(mut cmd: Command, shown: &str) -> BackendResult<()> {
    tracing::debug!(command = %shown, "spawning detached");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| BackendError::Spawn {
            program: program_name(&cmd),
            source,
        })?;
    Ok(())
}

fn to_command_output(output: Output) -> CommandOutput {
    CommandOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}
