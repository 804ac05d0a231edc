//! Execution backend port - one capability set for local and remote hosts
//!
//! Every filesystem and process operation the pipeline performs on the
//! deployment host goes through this trait, so the orchestrator is written once
//! and runs unchanged against the local machine or an ssh-reachable host.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend operation errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Local filesystem failure
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The program could not be started at all
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("`{command}` exited with {status:?}: {output}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        output: String,
    },

    /// A remote path that cannot be passed through safely
    #[error("unsafe remote path: {0}")]
    UnsafeRemotePath(String),
}

impl BackendError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A structured command: program plus argument list, never an interpolated string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (`None` if terminated by a signal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stdout followed by stderr, trimmed, for error reports
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }

    /// Turn a non-zero exit into `CommandFailed`
    pub fn check(self, command: impl std::fmt::Display) -> BackendResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(BackendError::CommandFailed {
                command: command.to_string(),
                status: self.status,
                output: self.combined(),
            })
        }
    }
}

/// Follows one log file: first the backlog, then appended lines
pub trait LogTail {
    /// Lines that became available since the previous call (may be empty)
    fn poll_lines(&mut self) -> BackendResult<Vec<String>>;

    /// The source went away and no further lines will arrive
    fn is_closed(&self) -> bool {
        false
    }
}

/// Capability set shared by the local and remote backends
///
/// Removal operations are idempotent: removing a missing path succeeds.
/// Nothing here is transactional; a failure leaves whatever was already done.
pub trait ExecutionBackend {
    /// Short description for banners and logs
    fn describe(&self) -> String;

    /// Run a command to completion and capture its output (non-zero exit is not an error)
    fn run(&self, command: &CommandSpec) -> BackendResult<CommandOutput>;

    /// Run a command and fail with `CommandFailed` on non-zero exit
    fn run_checked(&self, command: &CommandSpec) -> BackendResult<CommandOutput> {
        self.run(command)?.check(command)
    }

    /// Start a command without waiting for it
    fn spawn_detached(&self, command: &CommandSpec) -> BackendResult<()>;

    /// Copy the contents of `src` into `dst` on the target host, creating `dst`
    fn copy_tree(&self, src: &Path, dst: &Path) -> BackendResult<()>;

    /// Copy the contents of a build-host directory into `dst` on the target host
    fn upload_tree(&self, local_src: &Path, dst: &Path) -> BackendResult<()>;

    fn copy_file(&self, src: &Path, dst: &Path) -> BackendResult<()>;

    fn move_file(&self, src: &Path, dst: &Path) -> BackendResult<()>;

    fn remove_tree(&self, path: &Path) -> BackendResult<()>;

    fn remove_file(&self, path: &Path) -> BackendResult<()>;

    fn make_dirs(&self, path: &Path) -> BackendResult<()>;

    fn exists(&self, path: &Path) -> BackendResult<bool>;

    /// First match of a pattern whose final segment may contain `*`, `?` or `[...]`
    fn glob_first(&self, pattern: &Path) -> BackendResult<Option<PathBuf>>;

    /// Open a follower yielding the last `backlog` lines, then new ones
    fn tail(&self, path: &Path, backlog: usize) -> BackendResult<Box<dyn LogTail>>;
}
