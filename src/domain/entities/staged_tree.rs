//! Staged tree - the deployable mod directory assembled on the build host

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Name of the addon archive directory inside a staged mod
pub const ADDONS_DIR: &str = "addons";

/// A freshly staged mod directory and the artifacts placed into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTree {
    root: PathBuf,
    binary: PathBuf,
    archives: Vec<PathBuf>,
}

impl StagedTree {
    pub fn new(root: PathBuf, binary: PathBuf, archives: Vec<PathBuf>) -> Self {
        Self {
            root,
            binary,
            archives,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn addons_dir(&self) -> PathBuf {
        self.root.join(ADDONS_DIR)
    }

    /// Staged extension binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Content manifest: relative path -> `sha256:<hex>` for every file
    ///
    /// Hidden files are included; nothing under the root is filtered.
    pub fn manifest(&self) -> std::io::Result<BTreeMap<PathBuf, String>> {
        tree_manifest(&self.root)
    }
}

/// Content manifest of an arbitrary local directory
pub fn tree_manifest(root: &Path) -> std::io::Result<BTreeMap<PathBuf, String>> {
    let mut manifest = BTreeMap::new();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let content = std::fs::read(entry.path())?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        manifest.insert(relative, format!("sha256:{:x}", Sha256::digest(&content)));
    }

    Ok(manifest)
}
