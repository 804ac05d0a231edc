//! Application Layer
//!
//! Use cases that orchestrate a build or a deploy run.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT spawn processes itself (that is Infrastructure)
//! - Owns sequencing, validation and the cancellation policy
//!
//! ## Use Cases
//!
//! - `DeployOrchestrator` - `build` (stage only) and `run` (full pipeline)
//!
//! ## Services
//!
//! - `StagingPipeline` - rebuild the staged mod tree on the build host
//! - `ProcessController` - stop/start the server by name
//! - `LogFollower` - wait for and stream server logs
//! - `Poller` - bounded, cancellable readiness polling

pub mod cancel;
pub mod context;
pub mod log_follower;
pub mod orchestrator;
pub mod polling;
pub mod process;
mod progress;
pub mod staging;

#[cfg(test)]
mod test_support;

pub use cancel::{CancellationToken, Interrupt};
pub use context::{DeployContext, LogSettings};
pub use log_follower::{FollowOutcome, LogFollower, ReportOutcome};
pub use orchestrator::{Collaborators, DeployOrchestrator, RunOutcome};
pub use polling::{PollOutcome, PollPolicy, Poller};
pub use process::{ProcessController, StopOutcome};
pub use staging::StagingPipeline;
