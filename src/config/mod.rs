//! Configuration module for modship
//!
//! Precedence, highest first:
//! 1. CLI flags (target, architecture, profile)
//! 2. Environment variables (`MODSHIP_*`)
//! 3. Config file (`--config` or `modship.toml` in the project root)
//! 4. Built-in defaults

mod loader;
mod suggest;
mod types;

pub use loader::{
    load_or_default, log_level_from_env, with_env_overrides, ConfigWarning, CONFIG_FILE_NAME,
    ENV_DEPLOYMENT_PATH, ENV_LOG_LEVEL, ENV_REMOTE_HOST, ENV_SERVER_PATH,
};
pub use types::{Config, DeployConfig, LogsConfig, ProjectConfig, ToolsConfig};
