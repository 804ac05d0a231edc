//! Target resolution
//!
//! Maps an (os, arch) pair to the compiler triple and to every OS/arch-specific
//! name used downstream. Pure lookup: no IO, no environment.

use std::collections::BTreeMap;

use crate::domain::value_objects::{Arch, Os};
use crate::error::{DeployError, DeployResult};

/// Stems the per-target names are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    /// Base name of the staged extension binary (`esm` -> `esm_x64.dll`)
    pub extension_name: String,
    /// Cargo crate producing the extension (`esm_client` -> `libesm_client.so`)
    pub extension_crate: String,
    /// Server executable stem (`arma3server` -> `arma3server_x64.exe`)
    pub process_stem: String,
    /// Launch script stem (`Deploy_ESM` -> `Deploy_ESM_x64.bat`)
    pub launch_script_stem: String,
}

/// How the compiled artifact gets into the staged tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactInstall {
    Move,
    Copy,
}

/// Everything the pipeline needs to know about one (os, arch) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub os: Os,
    pub arch: Arch,
    pub compiler_triple: String,
    /// File name cargo produces under `target/<triple>/<profile>/`
    pub artifact_file_name: String,
    /// File name of the extension inside the staged mod tree
    pub binary_file_name: String,
    pub process_name: String,
    pub launch_script_name: String,
    pub install: ArtifactInstall,
}

/// Lookup table from (os, arch) to compiler triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    entries: Vec<(Os, Arch, String)>,
}

impl TargetTable {
    /// The four supported pairs
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                (Os::Windows, Arch::X86, "i686-pc-windows-msvc".to_string()),
                (Os::Windows, Arch::X64, "x86_64-pc-windows-msvc".to_string()),
                (Os::Linux, Arch::X86, "i686-unknown-linux-gnu".to_string()),
                (Os::Linux, Arch::X64, "x86_64-unknown-linux-gnu".to_string()),
            ],
        }
    }

    /// A table with no entries (every lookup fails)
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set (or, with an empty triple, remove) the triple for one pair
    pub fn set(&mut self, os: Os, arch: Arch, triple: impl Into<String>) {
        let triple = triple.into();
        self.entries.retain(|(o, a, _)| !(*o == os && *a == arch));
        if !triple.trim().is_empty() {
            self.entries.push((os, arch, triple.trim().to_string()));
        }
    }

    /// Apply `"<os>-<arch>" = "<triple>"` overrides from configuration
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> DeployResult<Self> {
        for (key, triple) in overrides {
            let (os, arch) = parse_pair(key)?;
            self.set(os, arch, triple.as_str());
        }
        Ok(self)
    }

    pub fn triple(&self, os: Os, arch: Arch) -> Option<&str> {
        self.entries
            .iter()
            .find(|(o, a, _)| *o == os && *a == arch)
            .map(|(_, _, t)| t.as_str())
    }

    /// Resolve the pair, or fail with `UnsupportedTarget`
    pub fn resolve(&self, os: Os, arch: Arch, naming: &NamingScheme) -> DeployResult<ResolvedTarget> {
        let triple = self
            .triple(os, arch)
            .ok_or_else(|| DeployError::UnsupportedTarget {
                os: os.to_string(),
                arch: arch.to_string(),
            })?;

        let suffix = arch.name_suffix();
        let resolved = match os {
            Os::Windows => ResolvedTarget {
                os,
                arch,
                compiler_triple: triple.to_string(),
                artifact_file_name: format!("{}.dll", naming.extension_crate),
                binary_file_name: format!("{}{}.dll", naming.extension_name, suffix),
                process_name: format!("{}{}.exe", naming.process_stem, suffix),
                launch_script_name: format!("{}{}.bat", naming.launch_script_stem, suffix),
                install: ArtifactInstall::Move,
            },
            Os::Linux => ResolvedTarget {
                os,
                arch,
                compiler_triple: triple.to_string(),
                artifact_file_name: format!("lib{}.so", naming.extension_crate),
                binary_file_name: format!("{}{}.so", naming.extension_name, suffix),
                process_name: format!("{}{}", naming.process_stem, suffix),
                launch_script_name: format!("{}{}.sh", naming.launch_script_stem, suffix),
                install: ArtifactInstall::Copy,
            },
        };

        Ok(resolved)
    }
}

impl Default for TargetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resolve against the built-in table
pub fn resolve(os: Os, arch: Arch, naming: &NamingScheme) -> DeployResult<ResolvedTarget> {
    TargetTable::builtin().resolve(os, arch, naming)
}

/// Parse `"<os>-<arch>"` (e.g. `linux-x86`) into a pair
pub fn parse_pair(key: &str) -> DeployResult<(Os, Arch)> {
    let unsupported = || DeployError::UnsupportedTarget {
        os: key.split_once('-').map(|(o, _)| o).unwrap_or(key).to_string(),
        arch: key.split_once('-').map(|(_, a)| a).unwrap_or("").to_string(),
    };
    let (os, arch) = key.split_once('-').ok_or_else(unsupported)?;
    let os: Os = os.parse().map_err(|_| unsupported())?;
    let arch: Arch = arch.parse().map_err(|_| unsupported())?;
    Ok((os, arch))
}
