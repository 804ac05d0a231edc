//! Common test utilities for modship CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project and home directories plus CLI helpers
//! - `write_script`: executable stand-ins for external tools (unix)

pub mod env;
#[cfg(unix)]
pub mod scripts;

pub use env::*;
#[cfg(unix)]
pub use scripts::*;
