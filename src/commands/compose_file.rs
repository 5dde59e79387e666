//! # Compose File Command Implementation
//!
//! Locates the nearest `docker-compose.yml`, makes sure its NFS override is
//! cached, and prints the `COMPOSE_FILE` value pairing the two:
//!
//! ```bash
//! export COMPOSE_FILE="$(mac-dev-shim compose-file)"
//! # or
//! eval "$(mac-dev-shim compose-file --export)"
//! ```
//!
//! The override is written only the first time a given descriptor is seen
//! at a given location; later runs reuse the cached file.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use mac_dev_shim::context::WorkingContext;
use mac_dev_shim::defaults::PROJECT_FILE_NAME;
use mac_dev_shim::pipeline::{self, PipelineOptions};
use mac_dev_shim::store::DiskStore;

/// Print the COMPOSE_FILE value for the nearest project file
#[derive(Args, Debug)]
pub struct ComposeFileArgs {
    /// Name of the project file searched for in this and parent directories.
    #[arg(short, long, value_name = "NAME", env = "MAC_DEV_SHIM_FILE", default_value = PROJECT_FILE_NAME)]
    pub file: String,

    /// Directory holding cached override files.
    ///
    /// Defaults to `~/Library/Caches/MacDevShim`.
    /// Can also be set with the `MAC_DEV_SHIM_CACHE` environment variable.
    #[arg(long, value_name = "DIR", env = "MAC_DEV_SHIM_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Print a shell `export COMPOSE_FILE=...` line instead of the bare value
    #[arg(long)]
    pub export: bool,
}

/// Execute the `compose-file` command.
pub fn execute(args: ComposeFileArgs) -> Result<()> {
    let ctx = WorkingContext::from_env().context("Failed to determine working context")?;
    let options = PipelineOptions {
        file_name: args.file,
        cache_root: args.cache_root,
    };

    let files = pipeline::run(&ctx, &DiskStore, &options)?;

    if args.export {
        println!("{}", files.export_line());
    } else {
        println!("{}", files.compose_file_value());
    }

    Ok(())
}
