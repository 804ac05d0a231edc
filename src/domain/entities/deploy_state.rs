//! Deploy state machine
//!
//! `Idle -> TargetResolved -> ServerStopped -> Staged -> Transferred ->
//! ServerStarted -> Following -> Done`, with `Failed` reachable from any
//! non-terminal state. No branching back.

use serde::Serialize;

use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    Idle,
    TargetResolved,
    ServerStopped,
    Staged,
    Transferred,
    ServerStarted,
    Following,
    Done,
    Failed,
}

impl DeployState {
    /// The only state this one may advance to (besides `Failed`)
    pub fn successor(&self) -> Option<DeployState> {
        match self {
            DeployState::Idle => Some(DeployState::TargetResolved),
            DeployState::TargetResolved => Some(DeployState::ServerStopped),
            DeployState::ServerStopped => Some(DeployState::Staged),
            DeployState::Staged => Some(DeployState::Transferred),
            DeployState::Transferred => Some(DeployState::ServerStarted),
            DeployState::ServerStarted => Some(DeployState::Following),
            DeployState::Following => Some(DeployState::Done),
            DeployState::Done | DeployState::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployState::Done | DeployState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployState::Idle => "idle",
            DeployState::TargetResolved => "target_resolved",
            DeployState::ServerStopped => "server_stopped",
            DeployState::Staged => "staged",
            DeployState::Transferred => "transferred",
            DeployState::ServerStarted => "server_started",
            DeployState::Following => "following",
            DeployState::Done => "done",
            DeployState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current state and every state visited
#[derive(Debug, Clone)]
pub struct DeployStateMachine {
    state: DeployState,
    history: Vec<DeployState>,
}

impl DeployStateMachine {
    pub fn new() -> Self {
        Self {
            state: DeployState::Idle,
            history: vec![DeployState::Idle],
        }
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    pub fn history(&self) -> &[DeployState] {
        &self.history
    }

    /// Move to the immediate successor; anything else is rejected
    pub fn advance(&mut self, to: DeployState) -> DeployResult<DeployState> {
        if self.state.successor() != Some(to) {
            return Err(self.invalid(to));
        }
        Ok(self.enter(to))
    }

    /// Move to `Failed` from any non-terminal state
    pub fn fail(&mut self) -> DeployResult<DeployState> {
        if self.state.is_terminal() {
            return Err(self.invalid(DeployState::Failed));
        }
        Ok(self.enter(DeployState::Failed))
    }

    fn enter(&mut self, to: DeployState) -> DeployState {
        let from = self.state;
        tracing::debug!(%from, %to, "deploy state transition");
        self.state = to;
        self.history.push(to);
        from
    }

    fn invalid(&self, to: DeployState) -> DeployError {
        DeployError::InvalidState {
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}

impl Default for DeployStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
