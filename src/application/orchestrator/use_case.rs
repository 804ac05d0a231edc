//! Deploy Orchestrator Use Case
//!
//! Owns validation, sequencing and the cancellation policy. Components never
//! call each other; everything flows through here as paths and names.

use crate::domain::entities::{DeployState, DeployStateMachine, StagedTree};
use crate::domain::ports::{
    ArchivePacker, Compiler, DatastoreReset, DeployEvent, DeployEventSink, ExecutionBackend,
    LogViewer,
};
use crate::error::{DeployError, DeployResult};

use super::super::cancel::CancellationToken;
use super::super::context::DeployContext;
use super::super::log_follower::{FollowOutcome, LogFollower, ReportOutcome};
use super::super::polling::{PollOutcome, PollPolicy, Poller};
use super::super::process::ProcessController;
use super::super::progress::step;
use super::super::staging::StagingPipeline;

const STEP_STOP: &str = "Stopping server";
const STEP_RESET: &str = "Resetting datastore";
const STEP_TRANSFER: &str = "Copying mod to server";
const STEP_START: &str = "Starting server";
const STEP_REPORT: &str = "Opening server report";

/// The ports a run drives
pub struct Collaborators<'a> {
    /// The build host, where staging happens
    pub local: &'a dyn ExecutionBackend,
    /// The deployment host (same machine in local mode)
    pub target: &'a dyn ExecutionBackend,
    pub compiler: &'a dyn Compiler,
    pub packer: &'a dyn ArchivePacker,
    pub datastore: Option<&'a dyn DatastoreReset>,
    /// Only used in local mode; the viewer runs on the build host
    pub viewer: Option<&'a dyn LogViewer>,
}

/// How a run that was not aborted ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Server restarted and the log stream closed on its own
    Done,
    /// Server restarted but its log never appeared
    LogTimedOut { what: String, attempts: u32 },
}

/// Top-level state machine for `build` and `run`
pub struct DeployOrchestrator<'a> {
    ctx: &'a DeployContext,
    tools: Collaborators<'a>,
    events: &'a dyn DeployEventSink,
    cancel: CancellationToken,
    poller: Poller,
    machine: DeployStateMachine,
}

impl<'a> DeployOrchestrator<'a> {
    pub fn new(
        ctx: &'a DeployContext,
        tools: Collaborators<'a>,
        events: &'a dyn DeployEventSink,
        cancel: CancellationToken,
    ) -> Self {
        let poller = Poller::new(PollPolicy {
            max_attempts: ctx.logs.attempts,
            interval: ctx.logs.interval,
        });
        Self {
            ctx,
            tools,
            events,
            cancel,
            poller,
            machine: DeployStateMachine::new(),
        }
    }

    /// Replace the readiness poller (tests use one that never sleeps)
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    pub fn state(&self) -> DeployState {
        self.machine.state()
    }

    pub fn history(&self) -> &[DeployState] {
        self.machine.history()
    }

    /// Stage the mod tree only; the deployment host is never touched
    pub fn build(&mut self) -> DeployResult<StagedTree> {
        self.events.on_event(DeployEvent::Started {
            command: "build",
            info: self.ctx.build_info(),
        });

        let result = self
            .transition(DeployState::TargetResolved)
            .and_then(|_| self.staging().stage(self.ctx));

        let state = match &result {
            Ok(_) => DeployState::Staged,
            Err(_) => self.fail(),
        };
        self.events.on_event(DeployEvent::Completed { state });
        result
    }

    /// The full pipeline: stop, stage, transfer, start, follow logs
    pub fn run(&mut self) -> DeployResult<RunOutcome> {
        self.events.on_event(DeployEvent::Started {
            command: "run",
            info: self.ctx.build_info(),
        });

        let result = self.run_steps();
        let state = match &result {
            Ok(_) => self.machine.state(),
            Err(_) => self.fail(),
        };
        self.events.on_event(DeployEvent::Completed { state });
        result
    }

    fn run_steps(&mut self) -> DeployResult<RunOutcome> {
        let ctx = self.ctx;
        self.transition(DeployState::TargetResolved)?;

        // nothing on either host has been touched before this passes
        ctx.validate_for_deploy()?;

        let process = ProcessController::new(self.tools.target);
        step(self.events, STEP_STOP, || process.stop(ctx))?;
        self.transition(DeployState::ServerStopped)?;

        match self.tools.datastore {
            Some(datastore) => step(self.events, STEP_RESET, || datastore.reset())?,
            None => {
                tracing::info!("no datastore reset command configured, skipping");
                self.events.on_event(DeployEvent::StepSkipped {
                    label: STEP_RESET.to_string(),
                    reason: "no reset command configured".to_string(),
                });
            }
        }

        let staged = self.staging().stage(ctx)?;
        self.transition(DeployState::Staged)?;

        let target = self.tools.target;
        step(self.events, STEP_TRANSFER, || {
            let deployed = ctx.deployed_mod_dir();
            target.remove_tree(&deployed)?;
            target.upload_tree(staged.root(), &deployed)?;
            Ok(())
        })?;
        self.transition(DeployState::Transferred)?;

        step(self.events, STEP_START, || process.start(ctx))?;
        self.transition(DeployState::ServerStarted)?;

        self.transition(DeployState::Following)?;
        self.cancel.arm();
        let followed = self.follow_logs();
        self.cancel.disarm();

        let followed = match followed {
            Err(err) if self.cancel.is_cancelled() => {
                tracing::debug!(error = %err, "follow phase failed after an interrupt");
                Following::Cancelled
            }
            other => other?,
        };

        match followed {
            Following::Cancelled => {
                self.events.on_event(DeployEvent::Notice {
                    message: "cancelled".to_string(),
                });
                step(self.events, STEP_STOP, || process.stop(ctx))?;
                Err(DeployError::Cancelled)
            }
            Following::TimedOut { what, attempts } => {
                self.events.on_event(DeployEvent::Notice {
                    message: format!("Failed to open {}", what),
                });
                self.transition(DeployState::Done)?;
                Ok(RunOutcome::LogTimedOut { what, attempts })
            }
            Following::Ended => {
                self.events.on_event(DeployEvent::Notice {
                    message: "log stream closed".to_string(),
                });
                self.transition(DeployState::Done)?;
                Ok(RunOutcome::Done)
            }
        }
    }

    fn follow_logs(&self) -> DeployResult<Following> {
        let ctx = self.ctx;
        let follower = LogFollower::new(self.tools.target, &self.poller, &self.cancel, self.events);

        let viewer = if ctx.deployment.is_local() {
            self.tools.viewer
        } else {
            None
        };
        self.events.on_event(DeployEvent::StepStarted {
            label: STEP_REPORT.to_string(),
        });
        match follower.open_report(&ctx.logs.report_glob, viewer)? {
            ReportOutcome::Opened(_) => self.finish(STEP_REPORT),
            ReportOutcome::Located(path) => {
                self.finish(STEP_REPORT);
                self.events.on_event(DeployEvent::Notice {
                    message: format!(
                        "Server report: {}:{}",
                        ctx.deployment.host().unwrap_or("localhost"),
                        path.display()
                    ),
                });
            }
            ReportOutcome::TimedOut { attempts } => {
                self.events.on_event(DeployEvent::StepFailed {
                    label: STEP_REPORT.to_string(),
                    error: format!("no server report after {} attempts", attempts),
                });
            }
            ReportOutcome::Cancelled => return Ok(Following::Cancelled),
        }

        let log = &ctx.logs.extension_log;
        let what = log
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| log.display().to_string());
        let label = format!("Opening {}", what);

        self.events.on_event(DeployEvent::StepStarted {
            label: label.clone(),
        });
        match follower.wait_for(log)? {
            PollOutcome::Ready { .. } => self.finish(&label),
            PollOutcome::TimedOut { attempts } => {
                self.events.on_event(DeployEvent::StepFailed {
                    label,
                    error: DeployError::Timeout {
                        what: what.clone(),
                        attempts,
                    }
                    .to_string(),
                });
                return Ok(Following::TimedOut { what, attempts });
            }
            PollOutcome::Cancelled => return Ok(Following::Cancelled),
        }

        Ok(match follower.stream(log, ctx.logs.backlog)? {
            FollowOutcome::Ended => Following::Ended,
            FollowOutcome::Cancelled => Following::Cancelled,
            FollowOutcome::TimedOut { attempts } => Following::TimedOut { what, attempts },
        })
    }

    fn staging(&self) -> StagingPipeline<'a> {
        StagingPipeline::new(
            self.tools.local,
            self.tools.compiler,
            self.tools.packer,
            self.events,
        )
    }

    fn transition(&mut self, to: DeployState) -> DeployResult<()> {
        let from = self.machine.advance(to)?;
        self.events.on_event(DeployEvent::StateChanged { from, to });
        Ok(())
    }

    fn finish(&self, label: &str) {
        self.events.on_event(DeployEvent::StepFinished {
            label: label.to_string(),
        });
    }

    /// Move to `Failed` unless already terminal
    fn fail(&mut self) -> DeployState {
        let from = self.machine.state();
        if self.machine.fail().is_ok() {
            self.events.on_event(DeployEvent::StateChanged {
                from,
                to: DeployState::Failed,
            });
        }
        self.machine.state()
    }
}

/// How the follow phase ended
enum Following {
    Ended,
    TimedOut { what: String, attempts: u32 },
    Cancelled,
}
