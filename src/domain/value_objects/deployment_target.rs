//! Deployment target value object - where the staged tree is installed and run.

use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};

/// Whether the target host is this machine or reachable over ssh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Local,
    Remote,
}

/// Deployment destination.
///
/// The mode is never stored: it is derived from the presence of a remote host,
/// so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    host: Option<String>,
    root_path: PathBuf,
}

impl DeploymentTarget {
    /// Build a deployment target from configuration.
    ///
    /// An empty (or whitespace) host means local deployment. Hosts that would be
    /// parsed as ssh options or split into several arguments are rejected.
    pub fn new(host: &str, root_path: impl Into<PathBuf>) -> DeployResult<Self> {
        let host = host.trim();
        let host = if host.is_empty() {
            None
        } else {
            validate_host(host)?;
            Some(host.to_string())
        };

        Ok(Self {
            host,
            root_path: root_path.into(),
        })
    }

    pub fn local(root_path: impl Into<PathBuf>) -> Self {
        Self {
            host: None,
            root_path: root_path.into(),
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        if self.host.is_some() {
            DeploymentMode::Remote
        } else {
            DeploymentMode::Local
        }
    }

    pub fn is_local(&self) -> bool {
        self.mode() == DeploymentMode::Local
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Human-readable destination (`host:path` or the local path)
    pub fn display_name(&self) -> String {
        match &self.host {
            Some(host) => format!("{}:{}", host, self.root_path.display()),
            None => self.root_path.display().to_string(),
        }
    }
}

fn validate_host(host: &str) -> DeployResult<()> {
    if host.starts_with('-') {
        return Err(DeployError::configuration(format!(
            "Remote host '{}' must not start with '-'",
            host
        )));
    }
    if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DeployError::configuration(format!(
            "Remote host '{}' must not contain whitespace",
            host
        )));
    }
    Ok(())
}
