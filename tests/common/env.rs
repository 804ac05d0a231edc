//! Test environment for isolated modship runs.
//!
//! Every run starts from a clean environment: `MODSHIP_*` variables from the
//! developer's shell never leak into a test.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const MODSHIP_VARS: &[&str] = &[
    "MODSHIP_SERVER_PATH",
    "MODSHIP_DEPLOYMENT_PATH",
    "MODSHIP_REMOTE_HOST",
    "MODSHIP_LOG_LEVEL",
    "RUST_LOG",
];

/// Result of running the modship binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated project directory with its own `HOME`
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    extra_path: Option<PathBuf>,
}

impl TestEnv {
    pub fn new() -> Self {
        let project_root = tempfile::tempdir().unwrap();
        // anchor project root discovery here
        fs::write(project_root.path().join("Cargo.lock"), "").unwrap();
        Self {
            project_root,
            home_dir: tempfile::tempdir().unwrap(),
            extra_path: None,
        }
    }

    /// Prepend a directory of stand-in tools to `PATH`
    pub fn with_path_dir(mut self, dir: &Path) -> Self {
        self.extra_path = Some(dir.to_path_buf());
        self
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Write a file under the project root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_modship"));
        cmd.args(args)
            .current_dir(self.project_root.path())
            .env("HOME", self.home_dir.path())
            .env("NO_COLOR", "1");
        for var in MODSHIP_VARS {
            cmd.env_remove(var);
        }
        if let Some(dir) = &self.extra_path {
            let path = std::env::var("PATH").unwrap_or_default();
            cmd.env("PATH", format!("{}:{}", dir.display(), path));
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().unwrap();
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
