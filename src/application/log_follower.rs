//! Log Follower
//!
//! Two independent bounded polls on the target host: the server report, which
//! is handed to a viewer once it exists, and the extension log, which is
//! streamed until the operator cancels.

use std::path::{Path, PathBuf};

use super::cancel::CancellationToken;
use super::polling::{PollOutcome, Poller};
use crate::domain::ports::{DeployEvent, DeployEventSink, ExecutionBackend, LogViewer};
use crate::error::DeployResult;

/// What happened to the server report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Found and handed to the viewer
    Opened(PathBuf),
    /// Found; no viewer can reach it, so only the path was reported
    Located(PathBuf),
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Why streaming the extension log stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The stream closed on its own (for example the ssh session dropped)
    Ended,
    /// The log never appeared
    TimedOut { attempts: u32 },
    /// The operator interrupted the stream
    Cancelled,
}

/// Polls for and streams log files through an execution backend
pub struct LogFollower<'a> {
    backend: &'a dyn ExecutionBackend,
    poller: &'a Poller,
    cancel: &'a CancellationToken,
    events: &'a dyn DeployEventSink,
}

impl<'a> LogFollower<'a> {
    pub fn new(
        backend: &'a dyn ExecutionBackend,
        poller: &'a Poller,
        cancel: &'a CancellationToken,
        events: &'a dyn DeployEventSink,
    ) -> Self {
        Self {
            backend,
            poller,
            cancel,
            events,
        }
    }

    /// Wait for the first match of `glob` and open it with `viewer`, if any
    pub fn open_report(
        &self,
        glob: &Path,
        viewer: Option<&dyn LogViewer>,
    ) -> DeployResult<ReportOutcome> {
        let outcome = self
            .poller
            .wait_until(self.cancel, || Ok(self.backend.glob_first(glob)?))?;

        Ok(match outcome {
            PollOutcome::Ready { value, .. } => match viewer {
                Some(viewer) => {
                    viewer.open(&value)?;
                    ReportOutcome::Opened(value)
                }
                None => ReportOutcome::Located(value),
            },
            PollOutcome::TimedOut { attempts } => ReportOutcome::TimedOut { attempts },
            PollOutcome::Cancelled => ReportOutcome::Cancelled,
        })
    }

    /// Wait for `path` to exist on the target host
    pub fn wait_for(&self, path: &Path) -> DeployResult<PollOutcome<()>> {
        let outcome = self
            .poller
            .wait_until(self.cancel, || Ok(self.backend.exists(path)?.then_some(())))?;
        if let PollOutcome::Ready { attempts, .. } = outcome {
            tracing::debug!(path = %path.display(), attempts, "log file appeared");
        }
        Ok(outcome)
    }

    /// Stream the last `backlog` lines of `path` and then every new one
    ///
    /// Only returns when the run is cancelled or the stream closes or fails.
    pub fn stream(&self, path: &Path, backlog: usize) -> DeployResult<FollowOutcome> {
        let mut tail = self.backend.tail(path, backlog)?;
        let interval = self.poller.policy().interval;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(FollowOutcome::Cancelled);
            }
            let lines = match tail.poll_lines() {
                Err(_) if self.cancel.is_cancelled() => return Ok(FollowOutcome::Cancelled),
                other => other?,
            };
            if lines.is_empty() {
                if tail.is_closed() {
                    tracing::info!(path = %path.display(), "log stream closed");
                    return Ok(FollowOutcome::Ended);
                }
                self.poller.sleep(interval);
                continue;
            }
            for line in lines {
                self.events.on_event(DeployEvent::LogLine { line });
            }
        }
    }

    /// [`wait_for`](Self::wait_for) followed by [`stream`](Self::stream)
    pub fn follow(&self, path: &Path, backlog: usize) -> DeployResult<FollowOutcome> {
        match self.wait_for(path)? {
            PollOutcome::Ready { .. } => self.stream(path, backlog),
            PollOutcome::TimedOut { attempts } => Ok(FollowOutcome::TimedOut { attempts }),
            PollOutcome::Cancelled => Ok(FollowOutcome::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::polling::PollPolicy;
    use crate::application::test_support::{CollectingSink, Killed, RecordingBackend};
    use std::cell::RefCell;
    use std::time::Duration;

    fn poller(max_attempts: u32) -> Poller {
        Poller::new(PollPolicy {
            max_attempts,
            interval: Duration::from_millis(500),
        })
        .with_sleep(|_| {})
    }

    #[derive(Default)]
    struct Viewer(RefCell<Vec<PathBuf>>);

    impl LogViewer for Viewer {
        fn open(&self, path: &Path) -> DeployResult<()> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn report_is_opened_once_it_exists() {
        let backend = RecordingBackend::new().glob_match(Some(3), "/srv/a3/server.rpt");
        let poller = poller(50);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();
        let viewer = Viewer::default();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .open_report(Path::new("/srv/a3/*.rpt"), Some(&viewer))
            .unwrap();

        assert_eq!(outcome, ReportOutcome::Opened(PathBuf::from("/srv/a3/server.rpt")));
        assert_eq!(backend.count("glob_first "), 3);
        assert_eq!(viewer.0.borrow().len(), 1);
    }

    #[test]
    fn report_without_viewer_is_located() {
        let backend = RecordingBackend::new().glob_match(Some(1), "/srv/a3/server.rpt");
        let poller = poller(50);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .open_report(Path::new("/srv/a3/*.rpt"), None)
            .unwrap();

        assert_eq!(outcome, ReportOutcome::Located(PathBuf::from("/srv/a3/server.rpt")));
    }

    #[test]
    fn missing_report_times_out() {
        let backend = RecordingBackend::new();
        let poller = poller(5);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .open_report(Path::new("/srv/a3/*.rpt"), None)
            .unwrap();

        assert_eq!(outcome, ReportOutcome::TimedOut { attempts: 5 });
    }

    #[test]
    fn follow_streams_until_the_tail_closes() {
        let backend = RecordingBackend::new()
            .exists_on_call(Some(2))
            .log(&["one", "two", "three"], true);
        let poller = poller(50);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .follow(Path::new("/srv/a3/esm.log"), 1000)
            .unwrap();

        assert_eq!(outcome, FollowOutcome::Ended);
        assert_eq!(sink.log_lines(), vec!["one", "two", "three"]);
        assert_eq!(backend.count("tail /srv/a3/esm.log 1000"), 1);
    }

    #[test]
    fn follow_of_a_missing_log_never_tails() {
        let backend = RecordingBackend::new();
        let poller = poller(50);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .follow(Path::new("/srv/a3/esm.log"), 1000)
            .unwrap();

        assert_eq!(outcome, FollowOutcome::TimedOut { attempts: 50 });
        assert_eq!(backend.count("tail "), 0);
    }

    #[test]
    fn cancelled_stream_returns_promptly() {
        let backend = RecordingBackend::new()
            .exists_on_call(Some(1))
            .log(&["first"], false);
        let poller = poller(50);
        let cancel = CancellationToken::new();
        cancel.arm();
        let hook = cancel.clone();
        let sink = CollectingSink::new().on_log_line(move || {
            hook.interrupt();
        });

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .follow(Path::new("/srv/a3/esm.log"), 10)
            .unwrap();

        assert_eq!(outcome, FollowOutcome::Cancelled);
        assert_eq!(sink.log_lines(), vec!["first"]);
    }

    #[test]
    fn tail_killed_by_the_interrupt_counts_as_cancelled() {
        let cancel = CancellationToken::new();
        cancel.arm();
        let backend = RecordingBackend::new()
            .exists_on_call(Some(1))
            .killed_by_interrupt(Killed::TailPoll, cancel.clone());
        let poller = poller(50);
        let sink = CollectingSink::new();

        let outcome = LogFollower::new(&backend, &poller, &cancel, &sink)
            .follow(Path::new("/srv/a3/esm.log"), 10)
            .unwrap();

        assert_eq!(outcome, FollowOutcome::Cancelled);
    }

    #[test]
    fn tail_failure_without_interrupt_is_an_error() {
        let backend = RecordingBackend::new()
            .exists_on_call(Some(1))
            .killed_by_interrupt(Killed::TailPoll, CancellationToken::new());
        let poller = poller(50);
        let cancel = CancellationToken::new();
        let sink = CollectingSink::new();

        let result = LogFollower::new(&backend, &poller, &cancel, &sink)
            .follow(Path::new("/srv/a3/esm.log"), 10);

        assert!(result.is_err());
    }
}
