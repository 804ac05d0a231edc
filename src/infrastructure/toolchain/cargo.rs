//! Extension compiler backed by cargo

use std::path::{Path, PathBuf};

use crate::domain::ports::{CommandSpec, Compiler, ExecutionBackend};
use crate::domain::services::ResolvedTarget;
use crate::domain::value_objects::{Os, Profile};
use crate::error::DeployResult;
use crate::infrastructure::backend::LocalBackend;

/// Runs `cargo build --target <triple>` in the project root
///
/// Windows builds go through `rustup run stable-<triple>` so the matching
/// MSVC toolchain is used even when it is not the default.
#[derive(Debug, Clone)]
pub struct CargoCompiler {
    project_root: PathBuf,
    target_dir: PathBuf,
}

impl CargoCompiler {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let target_dir = project_root.join("target");
        Self {
            project_root,
            target_dir,
        }
    }

    pub fn command(&self, target: &ResolvedTarget, profile: Profile) -> CommandSpec {
        let triple = target.compiler_triple.as_str();
        let mut cmd = match target.os {
            Os::Windows => CommandSpec::new("rustup")
                .arg("run")
                .arg(format!("stable-{triple}"))
                .arg("cargo"),
            Os::Linux => CommandSpec::new("cargo"),
        };
        cmd = cmd.args(["build", "--target", triple]);
        if profile == Profile::Release {
            cmd = cmd.arg("--release");
        }
        cmd.current_dir(&self.project_root)
    }

    /// Where cargo leaves the artifact for this target and profile
    pub fn artifact_path(&self, target: &ResolvedTarget, profile: Profile) -> PathBuf {
        self.target_dir
            .join(&target.compiler_triple)
            .join(profile.dir_name())
            .join(&target.artifact_file_name)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

impl Compiler for CargoCompiler {
    fn compile(&self, target: &ResolvedTarget, profile: Profile) -> DeployResult<PathBuf> {
        LocalBackend.run_checked(&self.command(target, profile))?;
        Ok(self.artifact_path(target, profile))
    }
}
