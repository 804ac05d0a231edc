//! Console Event Sink
//!
//! Human-readable progress: `<modship> - Compiling extension ... done`.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::{Color, Stylize};

use crate::domain::entities::DeployState;
use crate::domain::ports::{BuildInfo, DeployEvent, DeployEventSink};

const PREFIX: &str = "<modship>";

/// Event sink that prints progress lines to stdout
pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl ConsoleEventSink {
    pub fn stdout(color: bool) -> Self {
        Self::with_writer(io::stdout(), color)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, color: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            color,
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = write!(writer, "{}", text);
            let _ = writer.flush();
        }
    }
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).bold().to_string()
    } else {
        text.to_string()
    }
}

/// The banner printed at the start of a run
pub fn render_build_info(command: &str, info: &BuildInfo, color: bool) -> String {
    let rows = [
        ("command", command.to_string()),
        ("os", info.target.os.to_string()),
        ("arch", info.target.arch.to_string()),
        ("profile", info.target.profile.dir_name().to_string()),
        ("triple", info.compiler_triple.clone()),
        ("project directory", info.project_root.display().to_string()),
        ("build directory", info.build_dir.display().to_string()),
        ("server directory", info.server_path.display().to_string()),
        ("deploy directory", info.deployment_path.display().to_string()),
        (
            "remote host",
            info.remote_host
                .clone()
                .unwrap_or_else(|| "(local)".to_string()),
        ),
    ];

    let mut out = format!("{} - Build details\n", paint(PREFIX, Color::Blue, color));
    for (label, value) in rows {
        out.push_str(&format!("  {:17}: {}\n", label, value));
    }
    out
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let prefix = paint(PREFIX, Color::Blue, self.color);
        match event {
            DeployEvent::Started { command, info } => {
                self.write(&render_build_info(command, &info, self.color));
            }
            DeployEvent::StepStarted { label } => {
                self.write(&format!("{} - {} ... ", prefix, label));
            }
            DeployEvent::StepFinished { .. } => {
                self.write(&format!("{}\n", paint("done", Color::Green, self.color)));
            }
            DeployEvent::StepFailed { error, .. } => {
                self.write(&format!(
                    "{}\n{}\n",
                    paint("failed", Color::Red, self.color),
                    error
                ));
            }
            DeployEvent::StepSkipped { label, reason } => {
                self.write(&format!(
                    "{} - {} ... {} ({})\n",
                    prefix,
                    label,
                    paint("skipped", Color::Yellow, self.color),
                    reason
                ));
            }
            DeployEvent::StateChanged { .. } => {}
            DeployEvent::Notice { message } => {
                self.write(&format!("{} - {}\n", prefix, message));
            }
            DeployEvent::LogLine { line } => {
                self.write(&format!("{}\n", line));
            }
            DeployEvent::Completed { state } => {
                let status = match state {
                    DeployState::Done => paint("finished", Color::Green, self.color),
                    DeployState::Failed => paint("aborted", Color::Red, self.color),
                    _ => return,
                };
                self.write(&format!("{} - {}\n", prefix, status));
            }
        }
    }
}
