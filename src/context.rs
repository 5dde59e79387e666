//! Per-invocation working context
//!
//! The current and home directories are read from the process environment
//! exactly once, in [`WorkingContext::from_env`]. Everything downstream takes
//! the context as an explicit input, so tests can inject fake paths.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Immutable paths an invocation resolves everything against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingContext {
    current_dir: PathBuf,
    home_dir: PathBuf,
}

impl WorkingContext {
    /// Create a context from explicit paths.
    ///
    /// Both paths must be absolute.
    pub fn new(current_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Result<Self> {
        let current_dir = current_dir.into();
        let home_dir = home_dir.into();

        if !current_dir.is_absolute() {
            return Err(Error::Context {
                message: format!(
                    "current directory must be absolute: {}",
                    current_dir.display()
                ),
            });
        }
        if !home_dir.is_absolute() {
            return Err(Error::Context {
                message: format!("home directory must be absolute: {}", home_dir.display()),
            });
        }

        Ok(Self {
            current_dir,
            home_dir,
        })
    }

    /// Build the context from the calling environment.
    ///
    /// `$PWD` is preferred over the resolved working directory because it keeps
    /// the logical path the shell shows (symlinked project roots stay
    /// symlinked in the generated device paths).
    pub fn from_env() -> Result<Self> {
        let current_dir = match env::var_os("PWD").map(PathBuf::from) {
            Some(pwd) if pwd.is_absolute() => pwd,
            _ => env::current_dir()?,
        };

        let home_dir = dirs::home_dir().ok_or_else(|| Error::Context {
            message: "could not determine the home directory".to_string(),
        })?;

        Self::new(current_dir, home_dir)
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }
}
