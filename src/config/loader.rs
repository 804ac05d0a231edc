//! Configuration loading: defaults <- TOML file <- environment

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};
use crate::infrastructure::logging::LogLevel;

use super::suggest::{closest, parse_env_choice};
use super::types::Config;

/// Default config file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "modship.toml";

pub const ENV_SERVER_PATH: &str = "MODSHIP_SERVER_PATH";
pub const ENV_DEPLOYMENT_PATH: &str = "MODSHIP_DEPLOYMENT_PATH";
pub const ENV_REMOTE_HOST: &str = "MODSHIP_REMOTE_HOST";
pub const ENV_LOG_LEVEL: &str = "MODSHIP_LOG_LEVEL";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, ". Did you mean '{}'?", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| DeployError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| DeployError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit config file, or `modship.toml` in the project root, or defaults
///
/// An explicit path must exist; the implicit one is optional. Environment
/// overrides are applied last.
pub fn load_or_default(
    project_root: &Path,
    explicit: Option<&Path>,
) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => {
            let implicit = project_root.join(CONFIG_FILE_NAME);
            if implicit.is_file() {
                load_with_warnings(&implicit)?
            } else {
                tracing::debug!(path = %implicit.display(), "no config file, using defaults");
                (Config::default(), Vec::new())
            }
        }
    };
    Ok((config.with_env_overrides(), warnings))
}

/// Apply environment variable overrides (MODSHIP_* prefix)
///
/// Set-but-empty variables still override: an empty remote host forces a
/// local deployment even when the file names one.
pub fn with_env_overrides(mut config: Config, get_env: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(path) = get_env(ENV_SERVER_PATH) {
        config.deploy.server_path = path;
    }
    if let Some(path) = get_env(ENV_DEPLOYMENT_PATH) {
        config.deploy.deployment_path = path;
    }
    if let Some(host) = get_env(ENV_REMOTE_HOST) {
        config.deploy.remote_host = host;
    }
    config
}

/// `MODSHIP_LOG_LEVEL`, warning with a suggestion when it is not a level
pub fn log_level_from_env() -> LogLevel {
    match std::env::var(ENV_LOG_LEVEL) {
        Ok(value) => parse_log_level(&value, &mut std::io::stderr()),
        Err(_) => LogLevel::default(),
    }
}

fn parse_log_level<W: std::io::Write>(value: &str, writer: &mut W) -> LogLevel {
    parse_env_choice(
        ENV_LOG_LEVEL,
        value,
        &LogLevel::NAMES,
        |s| s.parse().ok(),
        LogLevel::default(),
        writer,
    )
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "project",
        "source_dir",
        "build_dir",
        "mod_name",
        "extension_name",
        "extension_crate",
        "log_file",
        "addons",
        "archive_extension",
        "deploy",
        "server_path",
        "deployment_path",
        "remote_host",
        "stale_paths",
        "launch_dir",
        "process_stem",
        "windows_launch_script",
        "linux_launch_script",
        "ssh_program",
        "scp_program",
        "ssh_options",
        "logs",
        "report_glob",
        "extension_log",
        "viewer",
        "attempts",
        "interval_ms",
        "backlog",
        "tools",
        "windows_packer",
        "linux_packer",
        "datastore_reset",
        "targets",
    ];

    closest(unknown, CANDIDATES).map(str::to_string)
}
