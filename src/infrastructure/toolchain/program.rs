//! Single-command collaborators: datastore reset and the log viewer

use std::path::Path;

use crate::domain::ports::{CommandSpec, DatastoreReset, ExecutionBackend, LogViewer};
use crate::error::{DeployError, DeployResult};
use crate::infrastructure::backend::LocalBackend;

/// Runs a configured argv to reset the server datastore
#[derive(Debug, Clone)]
pub struct CommandDatastoreReset {
    command: CommandSpec,
}

impl CommandDatastoreReset {
    /// `None` when the argv is empty
    pub fn from_argv(argv: &[String], cwd: &Path) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            command: CommandSpec::new(program.clone())
                .args(args.iter().cloned())
                .current_dir(cwd),
        })
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }
}

impl DatastoreReset for CommandDatastoreReset {
    fn reset(&self) -> DeployResult<()> {
        LocalBackend.run_checked(&self.command)?;
        Ok(())
    }
}

/// Opens files with a program on the build host (`code` by default)
#[derive(Debug, Clone)]
pub struct ProgramLogViewer {
    program: String,
}

impl ProgramLogViewer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LogViewer for ProgramLogViewer {
    fn open(&self, path: &Path) -> DeployResult<()> {
        if self.program.trim().is_empty() {
            return Err(DeployError::configuration("no log viewer configured"));
        }
        // editors are often `.cmd` shims on windows, which only cmd can resolve
        let command = if cfg!(windows) {
            CommandSpec::new("cmd").args(["/C", self.program.as_str()])
        } else {
            CommandSpec::new(self.program.clone())
        }
        .path_arg(path);
        LocalBackend.spawn_detached(&command)?;
        Ok(())
    }
}
