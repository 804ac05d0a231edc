//! Executable stand-ins for ssh, scp and build tools.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\nset -eu\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// `ssh [-o opt]... host command`: runs the command locally
pub fn fake_ssh(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ssh",
        r#"while [ "$1" = "-o" ]; do shift 2; done
shift
exec sh -c "$1"
"#,
    )
}

/// `scp [flags] -- src host:dst`: copies locally
pub fn fake_scp(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "scp",
        r#"while [ "$1" != "--" ]; do shift; done
shift
src="$1"
dst="${2#*:}"
exec cp -R -p "$src" "$dst"
"#,
    )
}
