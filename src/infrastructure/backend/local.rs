//! Local execution backend
//!
//! Runs commands and file operations directly on this machine.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use ignore::overrides::OverrideBuilder;

use super::command::{capture, spawn_quiet};
use super::tail::FileTail;
use crate::domain::ports::{
    BackendError, BackendResult, CommandOutput, CommandSpec, ExecutionBackend, LogTail,
};

/// Backend that acts on the local filesystem and process table
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.arg_list());
        if let Some(dir) = spec.cwd() {
            cmd.current_dir(expand_home(dir));
        }
        cmd
    }
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn copy_dir_contents(src: &Path, dst: &Path) -> BackendResult<()> {
    fs::create_dir_all(dst).map_err(|e| BackendError::io(dst, e))?;
    let entries = fs::read_dir(src).map_err(|e| BackendError::io(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BackendError::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| BackendError::io(&from, e))?;
        if file_type.is_symlink() {
            copy_link(&from, &to)?;
        } else if file_type.is_dir() {
            copy_dir_contents(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| BackendError::io(&from, e))?;
        }
    }
    Ok(())
}

/// Links are recreated, never followed
#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> BackendResult<()> {
    let target = fs::read_link(from).map_err(|e| BackendError::io(from, e))?;
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BackendError::io(to, e)),
    }
    std::os::unix::fs::symlink(&target, to).map_err(|e| BackendError::io(to, e))
}

#[cfg(not(unix))]
fn copy_link(from: &Path, _to: &Path) -> BackendResult<()> {
    tracing::warn!(path = %from.display(), "skipping symbolic link");
    Ok(())
}

fn ensure_parent(path: &Path) -> BackendResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| BackendError::io(parent, e))
        }
        _ => Ok(()),
    }
}

impl ExecutionBackend for LocalBackend {
    fn describe(&self) -> String {
        "local".to_string()
    }

    fn run(&self, command: &CommandSpec) -> BackendResult<CommandOutput> {
        capture(Self::command(command), &command.to_string())
    }

    fn spawn_detached(&self, command: &CommandSpec) -> BackendResult<()> {
        spawn_quiet(Self::command(command), &command.to_string())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        copy_dir_contents(&expand_home(src), &expand_home(dst))
    }

    fn upload_tree(&self, local_src: &Path, dst: &Path) -> BackendResult<()> {
        self.copy_tree(local_src, dst)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        let (src, dst) = (expand_home(src), expand_home(dst));
        ensure_parent(&dst)?;
        fs::copy(&src, &dst).map_err(|e| BackendError::io(&src, e))?;
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        let (src, dst) = (expand_home(src), expand_home(dst));
        ensure_parent(&dst)?;
        if let Err(rename_err) = fs::rename(&src, &dst) {
            // rename cannot cross filesystems; fall back to copy + delete
            if fs::copy(&src, &dst).is_err() {
                return Err(BackendError::io(&src, rename_err));
            }
            fs::remove_file(&src).map_err(|e| BackendError::io(&src, e))?;
        }
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> BackendResult<()> {
        let path = expand_home(path);
        let result = match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path),
            Ok(_) => fs::remove_file(&path),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::io(&path, e)),
        }
    }

    fn remove_file(&self, path: &Path) -> BackendResult<()> {
        let path = expand_home(path);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::io(&path, e)),
        }
    }

    fn make_dirs(&self, path: &Path) -> BackendResult<()> {
        let path = expand_home(path);
        fs::create_dir_all(&path).map_err(|e| BackendError::io(&path, e))
    }

    fn exists(&self, path: &Path) -> BackendResult<bool> {
        let path = expand_home(path);
        path.try_exists().map_err(|e| BackendError::io(&path, e))
    }

    fn glob_first(&self, pattern: &Path) -> BackendResult<Option<PathBuf>> {
        let pattern = expand_home(pattern);
        let (Some(dir), Some(name)) = (pattern.parent(), pattern.file_name()) else {
            return Ok(None);
        };
        if !dir.is_dir() {
            return Ok(None);
        }

        let matcher = OverrideBuilder::new(dir)
            .add(&name.to_string_lossy())
            .and_then(|builder| builder.build())
            .map_err(|e| BackendError::io(&pattern, std::io::Error::other(e)))?;

        let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| BackendError::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        candidates.sort();

        Ok(candidates
            .into_iter()
            .find(|path| matcher.matched(path, path.is_dir()).is_whitelist()))
    }

    fn tail(&self, path: &Path, backlog: usize) -> BackendResult<Box<dyn LogTail>> {
        Ok(Box::new(FileTail::new(&expand_home(path), backlog)))
    }
}
