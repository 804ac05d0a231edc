//! Deploy Event Port
//!
//! Observable interface for build and deploy runs: progress for the console,
//! NDJSON for automation.

use std::path::PathBuf;

use crate::domain::entities::DeployState;
use crate::domain::value_objects::BuildTarget;

/// Summary printed once at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub target: BuildTarget,
    pub compiler_triple: String,
    pub project_root: PathBuf,
    pub build_dir: PathBuf,
    pub server_path: PathBuf,
    pub deployment_path: PathBuf,
    pub remote_host: Option<String>,
}

/// Event emitted during a run
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Run started
    Started { command: &'static str, info: BuildInfo },

    /// A labelled step began
    StepStarted { label: String },

    /// The step finished successfully
    StepFinished { label: String },

    /// The step failed; the run is aborting
    StepFailed { label: String, error: String },

    /// Orchestrator state changed
    StateChanged { from: DeployState, to: DeployState },

    /// An optional step was skipped
    StepSkipped { label: String, reason: String },

    /// Operator-facing message that is not tied to a step
    Notice { message: String },

    /// A line streamed from the server log
    LogLine { line: String },

    /// Run finished (successfully or not)
    Completed { state: DeployState },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - ConsoleEventSink: progress lines in the terminal
/// - JsonEventSink: NDJSON event stream
/// - NoopEventSink: silent operation
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
