//! Configuration type definitions
//!
//! Every field has a default, so an empty (or missing) `modship.toml` is a
//! valid configuration for the stock layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DeployResult;

use super::loader::{self, ConfigWarning};

/// Root configuration (`modship.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    /// Compiler triple overrides keyed by `<os>-<arch>`; empty removes the pair
    #[serde(default)]
    pub targets: BTreeMap<String, String>,
}

/// Layout of the source tree and the staged mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Static mod tree, relative to the project root
    pub source_dir: PathBuf,

    /// Where the staged mod is assembled, relative to the project root
    pub build_dir: PathBuf,

    pub mod_name: String,
    pub extension_name: String,
    pub extension_crate: String,

    /// Extension log inside the mod tree, removed while staging
    pub log_file: PathBuf,

    pub addons: Vec<String>,
    pub archive_extension: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("@esm"),
            build_dir: PathBuf::from("target/arma"),
            mod_name: "@esm".to_string(),
            extension_name: "esm".to_string(),
            extension_crate: "esm_client".to_string(),
            log_file: PathBuf::from("log/esm.log"),
            addons: default_addons(),
            archive_extension: "pbo".to_string(),
        }
    }
}

fn default_addons() -> Vec<String> {
    [
        "exile_server_manager",
        "exile_server_overwrites",
        "exile_server_xm8",
        "exile_server_hacking",
        "exile_server_grinding",
        "exile_server_charge_plant_started",
        "exile_server_flag_steal_started",
        "exile_server_player_connected",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Where and how the staged tree is deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Server root on the target host (`MODSHIP_SERVER_PATH`)
    pub server_path: String,

    /// Deployment root; `_x64` is appended for x64 builds (`MODSHIP_DEPLOYMENT_PATH`)
    pub deployment_path: String,

    /// ssh destination; empty deploys locally (`MODSHIP_REMOTE_HOST`)
    pub remote_host: String,

    /// Removed from the server root before a linux start
    pub stale_paths: Vec<String>,

    /// Directory the launch script runs in; empty means the server root
    pub launch_dir: String,

    pub process_stem: String,
    pub windows_launch_script: String,
    pub linux_launch_script: String,

    pub ssh_program: String,
    pub scp_program: String,

    /// `-o` options passed to both ssh and scp
    pub ssh_options: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            server_path: String::new(),
            deployment_path: String::new(),
            remote_host: String::new(),
            stale_paths: ["@esm", "@exile", "@exileserver", "mpmissions"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            launch_dir: String::new(),
            process_stem: "arma3server".to_string(),
            windows_launch_script: "Deploy_ESM".to_string(),
            linux_launch_script: "esm_arma".to_string(),
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            ssh_options: Vec::new(),
        }
    }
}

/// Log discovery and streaming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Server report glob, relative to the server root
    pub report_glob: String,

    /// Extension log, relative to the server root
    pub extension_log: String,

    /// Program that opens the server report on the build host
    pub viewer: String,

    pub attempts: u32,
    pub interval_ms: u64,

    /// Lines of history shown before streaming
    pub backlog: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            report_glob: "ArmAServer/ArmAServer/*.rpt".to_string(),
            extension_log: "ArmAServer/@esm/log/esm.log".to_string(),
            viewer: "code".to_string(),
            attempts: 50,
            interval_ms: 500,
            backlog: 1000,
        }
    }
}

/// External tool command lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Packer argv on windows builds
    pub windows_packer: Vec<String>,

    /// Packer argv on linux builds
    pub linux_packer: Vec<String>,

    /// Datastore reset argv, run in the project root; empty skips the step
    pub datastore_reset: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            windows_packer: to_argv(&[
                "C:\\Program Files\\PBO Manager v.1.4 beta\\PBOConsole.exe",
                "-pack",
                "{source}",
                "{archive}",
            ]),
            linux_packer: to_argv(&["makepbo", "-P", "-@={addon}", "{source}", "{archive_stem}"]),
            datastore_reset: Vec::new(),
        }
    }
}

fn to_argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        Ok(loader::load_with_warnings(path)?.0)
    }

    /// Load configuration and return non-fatal warnings (e.g. unknown keys)
    pub fn load_with_warnings(path: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply `MODSHIP_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }
}
