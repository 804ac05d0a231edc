//! Terminal presentation helpers for the binary

pub mod terminal;

use crate::cli::ColorWhen;
use terminal::TerminalCapabilities;

/// Resolve `--color` against what the terminal supports
pub fn use_color(when: ColorWhen, caps: &TerminalCapabilities) -> bool {
    match when {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => caps.supports_color && !caps.is_ci,
    }
}
