//! Error types for modship
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::BackendError;

/// Result type alias for modship operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for modship operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Required configuration is missing or contradictory
    #[error("{message}")]
    Configuration { message: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// The (os, arch) pair has no entry in the target table
    #[error("unsupported build target '{os}-{arch}'")]
    UnsupportedTarget { os: String, arch: String },

    /// An external command (compiler, packer, ssh, ...) exited unsuccessfully
    #[error("command `{command}` failed ({})\n{output}", describe_status(.status))]
    ExternalCommand {
        command: String,
        status: Option<i32>,
        output: String,
    },

    /// A readiness poll ran out of attempts
    #[error("{what} did not appear after {attempts} attempts")]
    Timeout { what: String, attempts: u32 },

    /// The operator interrupted the run while logs were being followed
    #[error("cancelled by operator")]
    Cancelled,

    /// The orchestrator was asked to make an illegal state transition
    #[error("invalid state transition from {from} to {to}")]
    InvalidState { from: String, to: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Process exit code used by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. }
            | Self::InvalidConfig { .. }
            | Self::UnsupportedTarget { .. } => 2,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<BackendError> for DeployError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::CommandFailed {
                command,
                status,
                output,
            } => Self::ExternalCommand {
                command,
                status,
                output,
            },
            BackendError::Io { path, source } => Self::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {}", path.display(), source),
            )),
            BackendError::Spawn { program, source } => Self::ExternalCommand {
                command: program,
                status: None,
                output: source.to_string(),
            },
            BackendError::UnsafeRemotePath(path) => Self::Configuration {
                message: format!("refusing to use remote path '{}'", path),
            },
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal or not started".to_string(),
    }
}
