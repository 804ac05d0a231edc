//! In-memory fakes shared by the application tests

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::cancel::CancellationToken;
use crate::domain::ports::{
    BackendError, BackendResult, CommandOutput, CommandSpec, DeployEvent, DeployEventSink,
    ExecutionBackend, LogTail,
};

/// A query whose child process dies with the operator's interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Killed {
    ReportGlob,
    LogExists,
    TailPoll,
}

/// Records every call; scripted answers for `run`, `exists`, `glob_first` and `tail`
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    exit_codes: Mutex<HashMap<String, i32>>,
    /// `exists` turns true on this call (1-based); `None` means never
    exists_on_call: Option<u32>,
    exists_calls: AtomicU32,
    /// `glob_first` finds this path on call `.0`
    glob_match: Option<(u32, PathBuf)>,
    glob_calls: AtomicU32,
    log_lines: Vec<String>,
    /// The tail reports closed once its lines are drained
    log_closes: bool,
    killed: Option<(Killed, CancellationToken)>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists_on_call(mut self, call: Option<u32>) -> Self {
        self.exists_on_call = call;
        self
    }

    pub fn glob_match(mut self, call: Option<u32>, path: impl Into<PathBuf>) -> Self {
        self.glob_match = call.map(|n| (n, path.into()));
        self
    }

    /// Lines the tail yields; `closes` ends the stream after them
    pub fn log(mut self, lines: &[&str], closes: bool) -> Self {
        self.log_lines = lines.iter().map(|l| l.to_string()).collect();
        self.log_closes = closes;
        self
    }

    /// `query` interrupts `token` and then fails like an ssh child hit by SIGINT
    pub fn killed_by_interrupt(mut self, query: Killed, token: CancellationToken) -> Self {
        self.killed = Some((query, token));
        self
    }

    /// Exit status `run` reports for `program`
    pub fn with_exit_code(self, program: &str, code: i32) -> Self {
        self.exit_codes
            .lock()
            .unwrap()
            .insert(program.to_string(), code);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change the host (everything except queries)
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !c.starts_with("exists ") && !c.starts_with("glob_first ") && !c.starts_with("tail ")
            })
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_killed(&self, query: Killed, command: &str) -> BackendResult<()> {
        match &self.killed {
            Some((killed, token)) if *killed == query => {
                token.interrupt();
                Err(killed_by_signal(command))
            }
            _ => Ok(()),
        }
    }
}

fn killed_by_signal(command: &str) -> BackendError {
    BackendError::CommandFailed {
        command: command.to_string(),
        status: Some(255),
        output: "Killed by signal 2.".to_string(),
    }
}

impl ExecutionBackend for RecordingBackend {
    fn describe(&self) -> String {
        "recording".to_string()
    }

    fn run(&self, command: &CommandSpec) -> BackendResult<CommandOutput> {
        self.record(format!("run {}", command));
        let status = self
            .exit_codes
            .lock()
            .unwrap()
            .get(command.program())
            .copied()
            .unwrap_or(0);
        Ok(CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: if status == 0 {
                String::new()
            } else {
                format!("{} failed", command.program())
            },
        })
    }

    fn spawn_detached(&self, command: &CommandSpec) -> BackendResult<()> {
        self.record(format!("spawn {}", command));
        Ok(())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        self.record(format!("copy_tree {} {}", src.display(), dst.display()));
        Ok(())
    }

    fn upload_tree(&self, local_src: &Path, dst: &Path) -> BackendResult<()> {
        self.record(format!("upload_tree {} {}", local_src.display(), dst.display()));
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        self.record(format!("copy_file {} {}", src.display(), dst.display()));
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        self.record(format!("move_file {} {}", src.display(), dst.display()));
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> BackendResult<()> {
        self.record(format!("remove_tree {}", path.display()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> BackendResult<()> {
        self.record(format!("remove_file {}", path.display()));
        Ok(())
    }

    fn make_dirs(&self, path: &Path) -> BackendResult<()> {
        self.record(format!("make_dirs {}", path.display()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> BackendResult<bool> {
        self.record(format!("exists {}", path.display()));
        self.check_killed(Killed::LogExists, "ssh host test -e")?;
        let call = self.exists_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.exists_on_call.is_some_and(|n| call >= n))
    }

    fn glob_first(&self, pattern: &Path) -> BackendResult<Option<PathBuf>> {
        self.record(format!("glob_first {}", pattern.display()));
        self.check_killed(Killed::ReportGlob, "ssh host for f in")?;
        let call = self.glob_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(match &self.glob_match {
            Some((n, path)) if call >= *n => Some(path.clone()),
            _ => None,
        })
    }

    fn tail(&self, path: &Path, backlog: usize) -> BackendResult<Box<dyn LogTail>> {
        self.record(format!("tail {} {}", path.display(), backlog));
        Ok(Box::new(ScriptedTail {
            pending: self.log_lines.iter().cloned().collect(),
            closes: self.log_closes,
            killed: match &self.killed {
                Some((Killed::TailPoll, token)) => Some(token.clone()),
                _ => None,
            },
        }))
    }
}

/// Hands out every scripted line on the first poll, then nothing; a killed
/// tail fails its first poll instead
struct ScriptedTail {
    pending: VecDeque<String>,
    closes: bool,
    killed: Option<CancellationToken>,
}

impl LogTail for ScriptedTail {
    fn poll_lines(&mut self) -> BackendResult<Vec<String>> {
        if let Some(token) = &self.killed {
            token.interrupt();
            return Err(killed_by_signal("ssh host tail -F"));
        }
        Ok(self.pending.drain(..).collect())
    }

    fn is_closed(&self) -> bool {
        self.closes && self.pending.is_empty()
    }
}

/// Collects events; optionally runs a hook on every streamed log line
#[derive(Default, Clone)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<DeployEvent>>>,
    on_log_line: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_log_line(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_log_line = Some(Arc::new(hook));
        self
    }

    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::LogLine { line } => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::Notice { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl DeployEventSink for CollectingSink {
    fn on_event(&self, event: DeployEvent) {
        let is_line = matches!(event, DeployEvent::LogLine { .. });
        self.events.lock().unwrap().push(event);
        if is_line {
            if let Some(hook) = &self.on_log_line {
                hook();
            }
        }
    }
}
