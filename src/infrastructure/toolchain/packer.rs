//! Addon archive packer driven by an argv template

use std::path::{Path, PathBuf};

use crate::domain::ports::{ArchivePacker, CommandSpec, ExecutionBackend};
use crate::error::{DeployError, DeployResult};
use crate::infrastructure::backend::LocalBackend;

/// Substitute `{name}` placeholders in every word of an argv template
///
/// Unknown placeholders are left untouched.
pub fn expand_template(template: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    template
        .iter()
        .map(|word| {
            vars.iter().fold(word.clone(), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            })
        })
        .collect()
}

/// Runs the configured packing tool once per addon
///
/// Placeholders: `{source}`, `{archive}` (full archive path), `{archive_stem}`
/// (archive path without extension) and `{addon}`.
#[derive(Debug, Clone)]
pub struct CommandPacker {
    argv: Vec<String>,
    extension: String,
}

impl CommandPacker {
    pub fn new(argv: Vec<String>, extension: impl Into<String>) -> Self {
        Self {
            argv,
            extension: extension.into(),
        }
    }

    pub fn command(
        &self,
        source_dir: &Path,
        addon: &str,
        dest_dir: &Path,
    ) -> DeployResult<CommandSpec> {
        let archive = self.archive_path(addon, dest_dir);
        let archive_stem = dest_dir.join(addon);
        let source = source_dir.to_string_lossy().into_owned();
        let archive = archive.to_string_lossy().into_owned();
        let archive_stem = archive_stem.to_string_lossy().into_owned();
        let words = expand_template(
            &self.argv,
            &[
                ("source", source.as_str()),
                ("archive", archive.as_str()),
                ("archive_stem", archive_stem.as_str()),
                ("addon", addon),
            ],
        );
        let Some((program, args)) = words.split_first() else {
            return Err(DeployError::configuration(
                "archive packer command is empty; set [tools] packer in modship.toml",
            ));
        };
        Ok(CommandSpec::new(program.clone()).args(args.iter().cloned()))
    }

    fn archive_path(&self, addon: &str, dest_dir: &Path) -> PathBuf {
        dest_dir.join(format!("{}.{}", addon, self.extension))
    }
}

impl ArchivePacker for CommandPacker {
    fn pack(&self, source_dir: &Path, addon: &str, dest_dir: &Path) -> DeployResult<PathBuf> {
        let command = self.command(source_dir, addon, dest_dir)?;
        let output = LocalBackend.run_checked(&command)?;

        let archive = self.archive_path(addon, dest_dir);
        if !archive.is_file() {
            return Err(DeployError::ExternalCommand {
                command: command.to_string(),
                status: output.status,
                output: format!("expected archive {} was not produced", archive.display()),
            });
        }
        Ok(archive)
    }
}
