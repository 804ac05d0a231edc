//! POSIX shell quoting for commands sent to a remote host
//!
//! ssh hands the remote side a single command string, so every word built from
//! configuration or paths has to be quoted exactly once.

use std::path::Path;

/// Quote one word for a POSIX shell
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars().all(is_plain) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Quote and join several words into one command line
pub fn shell_join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| shell_quote(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote a remote path, keeping a leading `~` expandable
///
/// `~/mods/@esm` becomes `"$HOME"/mods/@esm`; quoting the tilde itself would
/// stop the remote shell from expanding it.
pub fn quote_remote_path(path: &Path) -> String {
    let p = path.to_string_lossy();
    if p == "~" {
        return "\"$HOME\"".to_string();
    }
    match p.strip_prefix("~/") {
        Some(rest) if rest.is_empty() => "\"$HOME\"/".to_string(),
        Some(rest) => format!("\"$HOME\"/{}", shell_quote(rest)),
        None => shell_quote(&p),
    }
}

/// Quote a glob segment: `*`, `?` and bracket classes stay live, everything else is literal
pub fn quote_glob_segment(segment: &str) -> String {
    let mut out = String::new();
    let mut literal = String::new();
    let mut in_class = false;

    for c in segment.chars() {
        let live = in_class || matches!(c, '*' | '?' | '[');
        if live {
            if !literal.is_empty() {
                out.push_str(&shell_quote(&literal));
                literal.clear();
            }
            if c == '[' {
                in_class = true;
            } else if c == ']' {
                in_class = false;
            }
            if in_class && c != '[' && !c.is_ascii_alphanumeric() && !matches!(c, '-' | '!' | '^')
            {
                out.push('\\');
            }
            out.push(c);
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        out.push_str(&shell_quote(&literal));
    }
    out
}

/// True if `path` can appear unquoted in an `scp` target under either scp protocol
pub fn is_transfer_safe(path: &str) -> bool {
    !path.is_empty()
        && path.starts_with('/')
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'))
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '=' | ',' | ':' | '@' | '+')
}
