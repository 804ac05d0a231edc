//! Deploy Context
//!
//! The immutable run context: configuration and CLI flags resolved once at
//! startup and passed by reference into every component.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::domain::ports::BuildInfo;
use crate::domain::services::{NamingScheme, ResolvedTarget, TargetTable};
use crate::domain::value_objects::{Arch, BuildTarget, DeploymentTarget, Os};
use crate::error::{DeployError, DeployResult};

/// Log discovery and streaming settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Server report glob on the target host
    pub report_glob: PathBuf,
    /// Extension log on the target host
    pub extension_log: PathBuf,
    pub viewer: String,
    pub attempts: u32,
    pub interval: Duration,
    pub backlog: usize,
}

/// Everything a build or run needs, fixed for its whole duration
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub project_root: PathBuf,
    pub build: BuildTarget,
    pub resolved: ResolvedTarget,
    pub deployment: DeploymentTarget,
    pub server_path: PathBuf,
    /// Static mod tree on the build host
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub mod_name: String,
    /// Extension log relative to the mod root
    pub log_file: PathBuf,
    pub addons: Vec<String>,
    pub archive_extension: String,
    pub stale_paths: Vec<String>,
    pub launch_dir: PathBuf,
    pub logs: LogSettings,
}

impl DeployContext {
    /// Resolve configuration for one build target
    pub fn from_config(
        config: &Config,
        project_root: &Path,
        build: BuildTarget,
    ) -> DeployResult<Self> {
        let table = TargetTable::builtin().with_overrides(&config.targets)?;
        let naming = NamingScheme {
            extension_name: config.project.extension_name.clone(),
            extension_crate: config.project.extension_crate.clone(),
            process_stem: config.deploy.process_stem.clone(),
            launch_script_stem: match build.os {
                Os::Windows => config.deploy.windows_launch_script.clone(),
                Os::Linux => config.deploy.linux_launch_script.clone(),
            },
        };
        let resolved = table.resolve(build.os, build.arch, &naming)?;

        let server_path = PathBuf::from(normalize_separators(config.deploy.server_path.trim()));
        let deployment_path = deployment_path(config.deploy.deployment_path.trim(), build.arch);
        let deployment = DeploymentTarget::new(&config.deploy.remote_host, deployment_path)?;

        let launch_dir = match config.deploy.launch_dir.trim() {
            "" => server_path.clone(),
            dir => PathBuf::from(normalize_separators(dir)),
        };

        let logs = LogSettings {
            report_glob: server_path.join(&config.logs.report_glob),
            extension_log: server_path.join(&config.logs.extension_log),
            viewer: config.logs.viewer.clone(),
            attempts: config.logs.attempts,
            interval: Duration::from_millis(config.logs.interval_ms),
            backlog: config.logs.backlog,
        };

        Ok(Self {
            project_root: project_root.to_path_buf(),
            build,
            resolved,
            deployment,
            server_path,
            source_dir: project_root.join(&config.project.source_dir),
            build_dir: project_root.join(&config.project.build_dir),
            mod_name: config.project.mod_name.clone(),
            log_file: config.project.log_file.clone(),
            addons: config.project.addons.clone(),
            archive_extension: config.project.archive_extension.clone(),
            stale_paths: stale_paths(&config.deploy.stale_paths)?,
            launch_dir,
            logs,
        })
    }

    /// `<build_dir>/<mod_name>`
    pub fn staged_root(&self) -> PathBuf {
        self.build_dir.join(&self.mod_name)
    }

    /// `<deployment root>/<mod_name>` on the target host
    pub fn deployed_mod_dir(&self) -> PathBuf {
        self.deployment.root_path().join(&self.mod_name)
    }

    /// Checks that must pass before anything on the target host is touched
    pub fn validate_for_deploy(&self) -> DeployResult<()> {
        if self.server_path.as_os_str().is_empty() {
            return Err(DeployError::configuration(
                "Server path is missing, please set it using `MODSHIP_SERVER_PATH` \
                 environment variable or `deploy.server_path` in modship.toml",
            ));
        }
        if self.deployment.root_path().as_os_str().is_empty() {
            return Err(DeployError::configuration(
                "Deployment path is missing, please set it using `MODSHIP_DEPLOYMENT_PATH` \
                 environment variable or `deploy.deployment_path` in modship.toml",
            ));
        }
        if !self.deployment.is_local() && self.build.os != Os::Linux {
            return Err(DeployError::configuration(format!(
                "Remote deployment to {} requires `--target linux`",
                self.deployment.display_name()
            )));
        }
        Ok(())
    }

    pub fn build_info(&self) -> BuildInfo {
        BuildInfo {
            target: self.build,
            compiler_triple: self.resolved.compiler_triple.clone(),
            project_root: self.project_root.clone(),
            build_dir: self.build_dir.clone(),
            server_path: self.server_path.clone(),
            deployment_path: self.deployment.root_path().to_path_buf(),
            remote_host: self.deployment.host().map(str::to_string),
        }
    }
}

/// The configured deployment root, with `_x64` appended for x64 builds
///
/// An empty root stays empty so validation can report it.
fn deployment_path(configured: &str, arch: Arch) -> PathBuf {
    if configured.is_empty() {
        return PathBuf::new();
    }
    let configured = normalize_separators(configured);
    let trimmed = configured.trim_end_matches('/');
    let base = if trimmed.is_empty() { "/" } else { trimmed };
    PathBuf::from(format!("{}{}", base, arch.name_suffix()))
}

/// Stale entries are removed recursively under the server root, so each must
/// name a directory strictly inside it
fn stale_paths(entries: &[String]) -> DeployResult<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            let normalized = normalize_separators(entry.trim());
            let inside_root = !normalized.is_empty()
                && !normalized.contains(':')
                && Path::new(&normalized)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if inside_root {
                Ok(normalized)
            } else {
                Err(DeployError::configuration(format!(
                    "invalid `deploy.stale_paths` entry '{}': expected a relative path \
                     inside the server directory",
                    entry
                )))
            }
        })
        .collect()
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Profile;

    fn config(server: &str, deployment: &str, host: &str) -> Config {
        let mut config = Config::default();
        config.deploy.server_path = server.to_string();
        config.deploy.deployment_path = deployment.to_string();
        config.deploy.remote_host = host.to_string();
        config
    }

    fn target(os: Os, arch: Arch) -> BuildTarget {
        BuildTarget::new(os, arch, Profile::Debug)
    }

    #[test]
    fn x64_deployment_path_gets_suffix() {
        let ctx = DeployContext::from_config(
            &config("/srv/a3", "/srv/deploy", ""),
            Path::new("/work"),
            target(Os::Windows, Arch::X64),
        )
        .unwrap();
        assert_eq!(ctx.deployment.root_path(), Path::new("/srv/deploy_x64"));
        assert_eq!(ctx.deployed_mod_dir(), PathBuf::from("/srv/deploy_x64/@esm"));
    }

    #[test]
    fn x86_deployment_path_is_unchanged() {
        let ctx = DeployContext::from_config(
            &config("/srv/a3", "/srv/deploy/", ""),
            Path::new("/work"),
            target(Os::Windows, Arch::X86),
        )
        .unwrap();
        assert_eq!(ctx.deployment.root_path(), Path::new("/srv/deploy"));
    }

    #[test]
    fn windows_server_path_uses_forward_slashes() {
        let ctx = DeployContext::from_config(
            &config("C:\\arma\\server", "D:\\deploy", ""),
            Path::new("/work"),
            target(Os::Windows, Arch::X86),
        )
        .unwrap();
        assert_eq!(ctx.server_path, PathBuf::from("C:/arma/server"));
        assert_eq!(ctx.launch_dir, ctx.server_path);
    }

    #[test]
    fn missing_server_path_is_reported_first() {
        let ctx = DeployContext::from_config(
            &config("", "", ""),
            Path::new("/work"),
            target(Os::Windows, Arch::X64),
        )
        .unwrap();
        let err = ctx.validate_for_deploy().unwrap_err();
        assert!(err.to_string().starts_with("Server path is missing"));
    }

    #[test]
    fn missing_deployment_path_is_reported() {
        let ctx = DeployContext::from_config(
            &config("/srv/a3", "", ""),
            Path::new("/work"),
            target(Os::Windows, Arch::X64),
        )
        .unwrap();
        let err = ctx.validate_for_deploy().unwrap_err();
        assert!(err.to_string().starts_with("Deployment path is missing"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn remote_windows_deployment_is_rejected() {
        let ctx = DeployContext::from_config(
            &config("~/arma_server", "~/deploy", "arma@host"),
            Path::new("/work"),
            target(Os::Windows, Arch::X64),
        )
        .unwrap();
        assert!(ctx.validate_for_deploy().is_err());
    }

    #[test]
    fn remote_linux_deployment_is_accepted() {
        let ctx = DeployContext::from_config(
            &config("~/arma_server", "~/deploy", "arma@host"),
            Path::new("/work"),
            target(Os::Linux, Arch::X64),
        )
        .unwrap();
        ctx.validate_for_deploy().unwrap();
        assert_eq!(
            ctx.logs.extension_log,
            PathBuf::from("~/arma_server/ArmAServer/@esm/log/esm.log")
        );
        assert_eq!(ctx.build_info().remote_host.as_deref(), Some("arma@host"));
    }

    #[test]
    fn removed_target_pair_fails_to_resolve() {
        let mut cfg = config("/srv/a3", "/srv/deploy", "");
        cfg.targets.insert("linux-x86".to_string(), String::new());
        let err =
            DeployContext::from_config(&cfg, Path::new("/work"), target(Os::Linux, Arch::X86))
                .unwrap_err();
        assert!(matches!(err, DeployError::UnsupportedTarget { .. }));
    }

    #[test]
    fn staged_root_is_under_build_dir() {
        let ctx = DeployContext::from_config(
            &Config::default(),
            Path::new("/work"),
            target(Os::Linux, Arch::X64),
        )
        .unwrap();
        assert_eq!(ctx.staged_root(), PathBuf::from("/work/target/arma/@esm"));
        assert_eq!(ctx.source_dir, PathBuf::from("/work/@esm"));
    }

    #[test]
    fn stale_paths_must_stay_inside_the_server_root() {
        for bad in ["/", "", "  ", "..", "../..", "@esm/../..", "/etc", "C:\\Windows", "./"] {
            let mut cfg = config("/srv/a3", "/srv/deploy", "");
            cfg.deploy.stale_paths = vec!["@esm".to_string(), bad.to_string()];
            let err =
                DeployContext::from_config(&cfg, Path::new("/work"), target(Os::Linux, Arch::X64))
                    .unwrap_err();
            assert_eq!(err.exit_code(), 2, "{bad:?}");
            assert!(err.to_string().contains("deploy.stale_paths"), "{bad:?}");
        }
    }

    #[test]
    fn nested_stale_paths_are_accepted() {
        let mut cfg = config("/srv/a3", "/srv/deploy", "");
        cfg.deploy.stale_paths = vec!["mpmissions\\Exile.Altis".to_string(), "@exile".to_string()];
        let ctx = DeployContext::from_config(&cfg, Path::new("/work"), target(Os::Linux, Arch::X64))
            .unwrap();
        assert_eq!(ctx.stale_paths, vec!["mpmissions/Exile.Altis", "@exile"]);
    }
}
