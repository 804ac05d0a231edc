//! Command handlers
//!
//! Each handler loads configuration, wires the infrastructure adapters into
//! the orchestrator and maps its outcome to the process exit status.

pub mod build;
mod project_root;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use modship::config::{self, Config};
use modship::domain::ports::{DeployEvent, DeployEventSink};
use modship::domain::value_objects::Os;
use modship::infrastructure::{CommandPacker, ConsoleEventSink, JsonEventSink};
use modship::{BuildTarget, DeployContext};

use crate::cli::{Cli, Commands};

pub use project_root::discover_project_root;

/// Everything a command needs after configuration is resolved
pub struct Session {
    pub project_root: PathBuf,
    pub config: Config,
    pub ctx: DeployContext,
    pub events: ReportingSink,
}

impl Session {
    pub fn open(cli: &Cli, color: bool, build: BuildTarget) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let project_root = discover_project_root(&cwd);
        let (config, warnings) = config::load_or_default(&project_root, cli.config.as_deref())?;
        for warning in &warnings {
            eprintln!("Warning: {}", warning);
        }
        let ctx = DeployContext::from_config(&config, &project_root, build)?;

        let inner: Box<dyn DeployEventSink> = if cli.json {
            Box::new(JsonEventSink::stdout())
        } else {
            Box::new(ConsoleEventSink::stdout(color))
        };

        Ok(Self {
            project_root,
            config,
            ctx,
            events: ReportingSink::new(inner),
        })
    }

    /// The archive packer for the target OS
    pub fn packer(&self) -> CommandPacker {
        let argv = match self.ctx.build.os {
            Os::Windows => &self.config.tools.windows_packer,
            Os::Linux => &self.config.tools.linux_packer,
        };
        CommandPacker::new(argv.clone(), self.config.project.archive_extension.clone())
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }
}

/// Forwards events and remembers whether the last step printed its own failure
pub struct ReportingSink {
    inner: Box<dyn DeployEventSink>,
    step_failed: AtomicBool,
}

impl ReportingSink {
    pub fn new(inner: Box<dyn DeployEventSink>) -> Self {
        Self {
            inner,
            step_failed: AtomicBool::new(false),
        }
    }

    /// The error that ended the run was already shown under its step
    pub fn failure_reported(&self) -> bool {
        self.step_failed.load(Ordering::SeqCst)
    }
}

impl DeployEventSink for ReportingSink {
    fn on_event(&self, event: DeployEvent) {
        match &event {
            DeployEvent::StepStarted { .. } => self.step_failed.store(false, Ordering::SeqCst),
            DeployEvent::StepFailed { .. } => self.step_failed.store(true, Ordering::SeqCst),
            _ => {}
        }
        self.inner.on_event(event);
    }
}

/// How a command ended, for the exit status
pub enum Finished {
    Ok,
    /// Failed, and the error is already on screen
    Reported(anyhow::Error),
}

pub fn dispatch(
    cli: &Cli,
    color: bool,
    cancel: &modship::CancellationToken,
) -> Result<Finished> {
    match &cli.command {
        Commands::Build(args) => build::cmd_build(cli, color, args.build_target()),
        Commands::Run(args) => run::cmd_run(cli, color, args.build_target(), cancel.clone()),
    }
}

/// Turn an orchestrator result into [`Finished`], keeping unreported errors
pub(crate) fn finish<T>(session: &Session, result: modship::DeployResult<T>) -> Result<Finished> {
    match result {
        Ok(_) => Ok(Finished::Ok),
        Err(err) if session.events.failure_reported() => Ok(Finished::Reported(err.into())),
        Err(err) => Err(err.into()),
    }
}
