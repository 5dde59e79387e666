//! `COMPOSE_FILE` value construction
//!
//! docker-compose reads a colon-separated file list from `COMPOSE_FILE`;
//! later files override earlier ones.

use std::fmt;
use std::path::PathBuf;

use crate::defaults::COMPOSE_FILE_VAR;

/// The base descriptor and its cached override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFiles {
    pub base_file: PathBuf,
    pub override_file: PathBuf,
}

impl ComposeFiles {
    /// `"<base>:<override>"`
    pub fn compose_file_value(&self) -> String {
        format!(
            "{}:{}",
            self.base_file.display(),
            self.override_file.display()
        )
    }

    /// A POSIX shell line exporting the value, for `eval "$(...)"`.
    pub fn export_line(&self) -> String {
        format!(
            "export {}={}",
            COMPOSE_FILE_VAR,
            shell_quote(&self.compose_file_value())
        )
    }
}

impl fmt::Display for ComposeFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose_file_value())
    }
}

/// Single-quote `value` for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
