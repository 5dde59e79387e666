//! # Override Command Implementation
//!
//! Prints the override that `compose-file` would cache for the nearest
//! project file, without reading or writing the cache. Useful for checking
//! which mounts are rewritten after editing `docker-compose.yml`.

use anyhow::{Context, Result};
use clap::Args;

use mac_dev_shim::context::WorkingContext;
use mac_dev_shim::defaults::PROJECT_FILE_NAME;
use mac_dev_shim::pipeline::{self, PipelineOptions};
use mac_dev_shim::store::DiskStore;

/// Print the derived override without caching it
#[derive(Args, Debug)]
pub struct OverrideArgs {
    /// Name of the project file searched for in this and parent directories.
    #[arg(short, long, value_name = "NAME", env = "MAC_DEV_SHIM_FILE", default_value = PROJECT_FILE_NAME)]
    pub file: String,
}

/// Execute the `override` command.
pub fn execute(args: OverrideArgs) -> Result<()> {
    let ctx = WorkingContext::from_env().context("Failed to determine working context")?;
    let options = PipelineOptions {
        file_name: args.file,
        cache_root: None,
    };

    let yaml = pipeline::render_override(&ctx, &DiskStore, &options)?;
    print!("{}", yaml);
    Ok(())
}
