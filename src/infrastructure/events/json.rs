//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, mut event: serde_json::Value) {
        if let Some(obj) = event.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::Started { command, info } => {
                serde_json::json!({
                    "event": "start",
                    "command": command,
                    "os": info.target.os.as_str(),
                    "arch": info.target.arch.as_str(),
                    "profile": info.target.profile.dir_name(),
                    "triple": info.compiler_triple,
                    "project_root": info.project_root.display().to_string(),
                    "build_dir": info.build_dir.display().to_string(),
                    "server_path": info.server_path.display().to_string(),
                    "deployment_path": info.deployment_path.display().to_string(),
                    "remote_host": info.remote_host,
                })
            }

            DeployEvent::StepStarted { label } => {
                serde_json::json!({ "event": "step_start", "label": label })
            }

            DeployEvent::StepFinished { label } => {
                serde_json::json!({ "event": "step_done", "label": label })
            }

            DeployEvent::StepFailed { label, error } => {
                serde_json::json!({
                    "event": "step_failed",
                    "label": label,
                    "error": error,
                })
            }

            DeployEvent::StepSkipped { label, reason } => {
                serde_json::json!({
                    "event": "step_skipped",
                    "label": label,
                    "reason": reason,
                })
            }

            DeployEvent::StateChanged { from, to } => {
                serde_json::json!({
                    "event": "state",
                    "from": from,
                    "to": to,
                })
            }

            DeployEvent::Notice { message } => {
                serde_json::json!({ "event": "notice", "message": message })
            }

            DeployEvent::LogLine { line } => {
                serde_json::json!({ "event": "log", "line": line })
            }

            DeployEvent::Completed { state } => {
                serde_json::json!({
                    "event": "complete",
                    "state": state,
                })
            }
        };

        self.write_event(json);
    }
}
