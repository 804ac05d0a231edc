//! Ports - the seams between orchestration logic and the outside world

pub mod collaborators;
pub mod deploy_events;
pub mod execution_backend;

pub use collaborators::{ArchivePacker, Compiler, DatastoreReset, LogViewer};
pub use deploy_events::{BuildInfo, DeployEvent, DeployEventSink, NoopEventSink};
pub use execution_backend::{
    BackendError, BackendResult, CommandOutput, CommandSpec, ExecutionBackend, LogTail,
};
