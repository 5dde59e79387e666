//! # Mac Dev Shim CLI
//!
//! This is the binary entry point for the `mac-dev-shim` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging to stderr so stdout carries only the report.
//! - Executing the selected command and turning failures into a message and
//!   a non-zero exit status.
//!
//! The core logic lives in the `mac_dev_shim` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
