//! Property tests for remote shell quoting.

#![cfg(unix)]

use std::path::Path;
use std::process::Command;

use proptest::prelude::*;

use modship::infrastructure::backend::quote::{quote_remote_path, shell_join, shell_quote};

/// What `sh -c 'printf %s <word>'` prints
fn echo_through_shell(quoted: &str) -> String {
    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("printf %s {}", quoted))
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

fn word() -> impl Strategy<Value = String> {
    "[^\\x00]{0,48}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: any NUL-free string survives one round through `sh`.
    #[test]
    fn property_quoted_word_is_literal(s in word()) {
        prop_assert_eq!(echo_through_shell(&shell_quote(&s)), s);
    }

    /// PROPERTY: joined words stay separate arguments.
    #[test]
    fn property_joined_words_keep_boundaries(words in proptest::collection::vec(word(), 1..5)) {
        let line = format!("printf '%s\\0' {}", shell_join(&words));
        let output = Command::new("sh").arg("-c").arg(line).output().unwrap();
        let printed: Vec<String> = String::from_utf8(output.stdout)
            .unwrap()
            .split_terminator('\0')
            .map(str::to_string)
            .collect();
        prop_assert_eq!(printed, words);
    }

    /// PROPERTY: absolute paths are quoted like plain words.
    #[test]
    fn property_absolute_path_is_literal(rest in "[^\\x00]{0,32}") {
        let path = format!("/{}", rest);
        prop_assert_eq!(echo_through_shell(&quote_remote_path(Path::new(&path))), path);
    }

    /// PROPERTY: `~/` paths expand to `$HOME` and keep the remainder literal.
    #[test]
    fn property_tilde_path_expands_home(rest in "[A-Za-z0-9 '$;&|*_.-]{1,24}") {
        let quoted = quote_remote_path(Path::new(&format!("~/{}", rest)));
        let home = std::env::var("HOME").unwrap_or_default();
        prop_assert_eq!(echo_through_shell(&quoted), format!("{}/{}", home, rest));
    }
}
