//! # Error Handling
//!
//! This module defines the centralized error type for `mac-dev-shim`. It uses
//! the `thiserror` library to describe every failure the library can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Discovery and schema failures are the two
//!   domain errors; the remaining variants wrap I/O, YAML and regex failures
//!   from the underlying libraries.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! All errors are fatal for a single invocation. Malformed individual volume
//! specifications are never errors; they are skipped by the transformer.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for mac-dev-shim operations
#[derive(Error, Debug)]
pub enum Error {
    /// No directory between the start directory and the filesystem root
    /// contains the project file.
    #[error("could not find {file_name} in this or any parent directory (searched from {start})", start = .start.display())]
    NotFound { file_name: String, start: PathBuf },

    /// The base descriptor is missing a field the override depends on.
    ///
    /// docker-compose rejects merged files with mismatched versions, so an
    /// override is never produced without one.
    #[error("Schema error in {file}: {message}")]
    Schema { file: String, message: String },

    /// The working context could not be determined from the environment.
    #[error("Working context error: {message}")]
    Context { message: String },

    /// An error occurred with a cache operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
