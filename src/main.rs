//! modship CLI
//!
//! Usage: modship [--json] [-v...] [--config <path>] <COMMAND>
//!
//! Commands:
//!   build   Compile the extension and stage the mod tree
//!   run     Build, deploy, restart the server and follow its logs

mod cli;
mod commands;
mod ui;

use clap::Parser;

use modship::config::log_level_from_env;
use modship::infrastructure::init_logging;
use modship::{CancellationToken, DeployError, Interrupt};

use crate::cli::{Cli, ColorWhen};
use crate::commands::Finished;

/// Exit status when the process is interrupted
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    let caps = ui::terminal::detect_capabilities();
    let color = !cli.json && ui::use_color(cli.color, &caps);

    let level = log_level_from_env().raised_by(cli.verbose);
    let ansi_logs = match cli.color {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => caps.stderr_tty && !caps.is_ci,
    };
    if let Err(err) = init_logging(level, ansi_logs) {
        eprintln!("Warning: {}", err);
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        if handler_token.interrupt() == Interrupt::Exit {
            std::process::exit(EXIT_INTERRUPTED);
        }
    }) {
        tracing::warn!(error = %err, "could not install the interrupt handler");
    }

    let code = match commands::dispatch(&cli, color, &cancel) {
        Ok(Finished::Ok) => 0,
        Ok(Finished::Reported(err)) => exit_code(&err),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<DeployError>()
        .map(DeployError::exit_code)
        .unwrap_or(1)
}
