//! Execution backends: the local machine or an ssh-reachable host

mod command;
mod local;
pub mod quote;
mod remote;
mod tail;

pub use local::{expand_home, LocalBackend};
pub use remote::{render_remote_command, RemoteBackend};
pub use tail::{FileTail, ProcessTail};

use crate::domain::ports::ExecutionBackend;
use crate::domain::value_objects::DeploymentTarget;

/// Pick the backend for a deployment target
pub fn backend_for(
    target: &DeploymentTarget,
    remote: &RemoteSettings,
) -> Box<dyn ExecutionBackend> {
    match target.host() {
        None => Box::new(LocalBackend::new()),
        Some(host) => Box::new(
            RemoteBackend::new(host)
                .with_programs(&remote.ssh_program, &remote.scp_program)
                .with_options(remote.ssh_options.clone()),
        ),
    }
}

/// Client programs and options for the remote backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub ssh_program: String,
    pub scp_program: String,
    pub ssh_options: Vec<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            ssh_options: Vec::new(),
        }
    }
}
