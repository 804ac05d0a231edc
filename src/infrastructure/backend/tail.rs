//! Log followers: a polling file reader and a wrapper around a streaming child

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::domain::ports::{BackendError, BackendResult, LogTail};

/// Follows a local file by re-reading from the last offset on every poll
///
/// The first poll yields at most `backlog` lines from the end of the file.
/// A file that shrinks is treated as truncated and re-read from the start.
#[derive(Debug)]
pub struct FileTail {
    path: PathBuf,
    offset: u64,
    /// Bytes after the last newline, possibly ending mid-character
    partial: Vec<u8>,
    backlog: Option<usize>,
}

impl FileTail {
    pub fn new(path: &Path, backlog: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            offset: 0,
            partial: Vec::new(),
            backlog: Some(backlog),
        }
    }
}

impl LogTail for FileTail {
    fn poll_lines(&mut self) -> BackendResult<Vec<String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            // rotated away between polls; wait for it to come back
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackendError::io(&self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| BackendError::io(&self.path, e))?
            .len();
        if len < self.offset {
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))
            .map_err(|e| BackendError::io(&self.path, e))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| BackendError::io(&self.path, e))?;
        self.offset += buf.len() as u64;

        self.partial.extend_from_slice(&buf);
        let mut lines = split_complete_lines(&mut self.partial);

        if let Some(limit) = self.backlog.take() {
            if lines.len() > limit {
                lines.drain(..lines.len() - limit);
            }
        }
        Ok(lines)
    }
}

/// Drain every newline-terminated line out of `buffer`, leaving the remainder
fn split_complete_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let Some(last_newline) = buffer.iter().rposition(|&b| b == b'\n') else {
        return Vec::new();
    };
    let rest = buffer.split_off(last_newline + 1);
    let complete = std::mem::replace(buffer, rest);
    complete[..last_newline]
        .split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

/// Follows the stdout of a long-running child such as `ssh host tail -F`
///
/// A reader thread forwards lines over a channel so polling never blocks.
/// The child is killed when the follower is dropped.
pub struct ProcessTail {
    child: Child,
    shown: String,
    lines: Receiver<String>,
    pending: VecDeque<String>,
    closed: bool,
}

impl ProcessTail {
    pub fn spawn(mut cmd: Command, shown: String) -> BackendResult<Self> {
        tracing::debug!(command = %shown, "starting log stream");
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: cmd.get_program().to_string_lossy().into_owned(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            thread::spawn(move || {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                // whole lines only, so multibyte characters are never split
                while matches!(reader.read_until(b'\n', &mut buf), Ok(n) if n > 0) {
                    let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
                    let line = line.strip_suffix(b"\r").unwrap_or(line);
                    if tx.send(String::from_utf8_lossy(line).into_owned()).is_err() {
                        break;
                    }
                    buf.clear();
                }
            });
        }

        Ok(Self {
            child,
            shown,
            lines: rx,
            pending: VecDeque::new(),
            closed: false,
        })
    }
}

impl LogTail for ProcessTail {
    fn poll_lines(&mut self) -> BackendResult<Vec<String>> {
        loop {
            match self.lines.try_recv() {
                Ok(line) => self.pending.push_back(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    let status = self
                        .child
                        .wait()
                        .map_err(|source| BackendError::Spawn {
                            program: self.shown.clone(),
                            source,
                        })?;
                    if !status.success() && self.pending.is_empty() {
                        return Err(BackendError::CommandFailed {
                            command: self.shown.clone(),
                            status: status.code(),
                            output: "log stream ended".to_string(),
                        });
                    }
                    self.closed = true;
                    break;
                }
            }
        }
        Ok(self.pending.drain(..).collect())
    }

    fn is_closed(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}

impl Drop for ProcessTail {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
