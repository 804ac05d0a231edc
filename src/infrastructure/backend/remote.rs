//! Remote execution backend over ssh/scp
//!
//! Every operation becomes one `ssh <host> '<command>'` round trip; trees are
//! transferred with `scp -r` into a remote scratch directory and then copied
//! into place. All words are quoted with [`super::quote`].

use std::path::{Path, PathBuf};
use std::process::Command;

use super::command::capture;
use super::quote::{
    is_transfer_safe, quote_glob_segment, quote_remote_path, shell_join, shell_quote,
};
use super::tail::ProcessTail;
use crate::domain::ports::{
    BackendError, BackendResult, CommandOutput, CommandSpec, ExecutionBackend, LogTail,
};

/// Backend that executes everything on an ssh-reachable host
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    host: String,
    ssh_program: String,
    scp_program: String,
    ssh_options: Vec<String>,
}

impl RemoteBackend {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            ssh_options: Vec::new(),
        }
    }

    /// Override the `ssh` and `scp` executables
    pub fn with_programs(mut self, ssh: impl Into<String>, scp: impl Into<String>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }

    /// `-o` options passed to both ssh and scp (e.g. `Port=2222`)
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.ssh_options = options;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn option_args(&self) -> Vec<String> {
        self.ssh_options
            .iter()
            .flat_map(|opt| ["-o".to_string(), opt.clone()])
            .collect()
    }

    fn ssh(&self, remote_command: &str) -> (Command, String) {
        let mut cmd = Command::new(&self.ssh_program);
        cmd.args(self.option_args())
            .arg(&self.host)
            .arg(remote_command);
        let shown = format!("{} {} {}", self.ssh_program, self.host, remote_command);
        (cmd, shown)
    }

    fn exec(&self, remote_command: &str) -> BackendResult<CommandOutput> {
        let (cmd, shown) = self.ssh(remote_command);
        capture(cmd, &shown)
    }

    fn exec_checked(&self, remote_command: &str) -> BackendResult<CommandOutput> {
        let (cmd, shown) = self.ssh(remote_command);
        capture(cmd, &shown)?.check(shown)
    }

    /// Remote scratch directory for a transfer
    fn scratch_dir(&self) -> BackendResult<String> {
        let output = self.exec_checked("mktemp -d")?;
        let dir = output.stdout.trim().to_string();
        if !is_transfer_safe(&dir) {
            return Err(BackendError::UnsafeRemotePath(dir));
        }
        Ok(dir)
    }

    /// Best-effort removal after a failed transfer; the transfer error wins
    fn discard_scratch(&self, scratch: &str) {
        let removed = self
            .exec(&format!("rm -rf -- {}", shell_quote(scratch)))
            .and_then(|out| out.check(format!("rm -rf -- {}", scratch)));
        if let Err(err) = removed {
            tracing::warn!(
                host = %self.host,
                scratch,
                error = %err,
                "could not remove remote scratch directory"
            );
        }
    }
}

/// Render a structured command as one remote shell line
pub fn render_remote_command(command: &CommandSpec) -> String {
    let mut words = vec![command.program().to_string()];
    words.extend(command.arg_list().iter().cloned());
    let line = shell_join(&words);
    match command.cwd() {
        Some(dir) => format!("cd {} && {}", quote_remote_path(dir), line),
        None => line,
    }
}

impl ExecutionBackend for RemoteBackend {
    fn describe(&self) -> String {
        format!("ssh {}", self.host)
    }

    fn run(&self, command: &CommandSpec) -> BackendResult<CommandOutput> {
        self.exec(&render_remote_command(command))
    }

    fn spawn_detached(&self, command: &CommandSpec) -> BackendResult<()> {
        let mut words = vec![command.program().to_string()];
        words.extend(command.arg_list().iter().cloned());
        let detached = format!("nohup {} </dev/null >/dev/null 2>&1 &", shell_join(&words));
        let line = match command.cwd() {
            Some(dir) => format!("cd {} && {}", quote_remote_path(dir), detached),
            None => detached,
        };
        self.exec_checked(&line)?;
        Ok(())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        let dst = quote_remote_path(dst);
        self.exec_checked(&format!(
            "mkdir -p -- {dst} && cp -R -- {} {dst}",
            quote_remote_path(&src.join("."))
        ))?;
        Ok(())
    }

    fn upload_tree(&self, local_src: &Path, dst: &Path) -> BackendResult<()> {
        let local_src =
            std::path::absolute(local_src).map_err(|e| BackendError::io(local_src, e))?;
        let Some(base) = local_src.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Err(BackendError::io(
                &local_src,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no directory name"),
            ));
        };

        let scratch = self.scratch_dir()?;

        let mut scp = Command::new(&self.scp_program);
        scp.args(["-r", "-p", "-q"])
            .args(self.option_args())
            .arg("--")
            .arg(&local_src)
            .arg(format!("{}:{}/", self.host, scratch));
        let shown = format!(
            "{} -r {} {}:{}/",
            self.scp_program,
            local_src.display(),
            self.host,
            scratch
        );
        let copied = capture(scp, &shown).and_then(|out| out.check(&shown));
        if let Err(e) = copied {
            self.discard_scratch(&scratch);
            return Err(e);
        }

        let staged = Path::new(&scratch).join(base).join(".");
        let dst = quote_remote_path(dst);
        self.exec_checked(&format!(
            "mkdir -p -- {dst} && cp -R -- {} {dst} && rm -rf -- {}",
            quote_remote_path(&staged),
            shell_quote(&scratch)
        ))?;
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        self.exec_checked(&format!(
            "{}cp -- {} {}",
            mkdir_parent(dst),
            quote_remote_path(src),
            quote_remote_path(dst)
        ))?;
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path) -> BackendResult<()> {
        self.exec_checked(&format!(
            "{}mv -f -- {} {}",
            mkdir_parent(dst),
            quote_remote_path(src),
            quote_remote_path(dst)
        ))?;
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> BackendResult<()> {
        self.exec_checked(&format!("rm -rf -- {}", quote_remote_path(path)))?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> BackendResult<()> {
        self.exec_checked(&format!("rm -f -- {}", quote_remote_path(path)))?;
        Ok(())
    }

    fn make_dirs(&self, path: &Path) -> BackendResult<()> {
        self.exec_checked(&format!("mkdir -p -- {}", quote_remote_path(path)))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> BackendResult<bool> {
        let line = format!("test -e {}", quote_remote_path(path));
        let output = self.exec(&line)?;
        match output.status {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            status => Err(BackendError::CommandFailed {
                command: line,
                status,
                output: output.combined(),
            }),
        }
    }

    fn glob_first(&self, pattern: &Path) -> BackendResult<Option<PathBuf>> {
        let (Some(dir), Some(name)) = (pattern.parent(), pattern.file_name()) else {
            return Ok(None);
        };
        let glob = format!(
            "{}/{}",
            quote_remote_path(dir),
            quote_glob_segment(&name.to_string_lossy())
        );
        let output = self.exec_checked(&format!(
            "for f in {glob}; do if [ -e \"$f\" ]; then printf '%s\\n' \"$f\"; break; fi; done"
        ))?;
        Ok(output
            .stdout
            .lines()
            .next()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from))
    }

    fn tail(&self, path: &Path, backlog: usize) -> BackendResult<Box<dyn LogTail>> {
        let (cmd, shown) = self.ssh(&format!(
            "tail -n {} -F {}",
            backlog,
            quote_remote_path(path)
        ));
        Ok(Box::new(ProcessTail::spawn(cmd, shown)?))
    }
}

fn mkdir_parent(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            format!("mkdir -p -- {} && ", quote_remote_path(parent))
        }
        _ => String::new(),
    }
}
