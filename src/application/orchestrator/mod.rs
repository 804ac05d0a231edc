//! Deploy Orchestrator
//!
//! Drives a build or a full deploy run through the state machine:
//!
//! `Idle -> TargetResolved -> ServerStopped -> Staged -> Transferred ->
//! ServerStarted -> Following -> Done`, with `Failed` from any non-terminal
//! state.
//!
//! ## Structure
//!
//! - `use_case` - `DeployOrchestrator`, `Collaborators`, `RunOutcome`

mod use_case;

pub use use_case::{Collaborators, DeployOrchestrator, RunOutcome};
