//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Mac Dev Shim - Serve docker-compose bind mounts over NFS
#[derive(Parser, Debug)]
#[command(name = "mac-dev-shim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the COMPOSE_FILE value for the nearest docker-compose.yml
    ComposeFile(commands::compose_file::ComposeFileArgs),

    /// Print the derived override without caching it
    Override(commands::override_file::OverrideArgs),

    /// Manage cached override files
    Cache(commands::cache::CacheArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::ComposeFile(args) => commands::compose_file::execute(args),
            Commands::Override(args) => commands::override_file::execute(args),
            Commands::Cache(args) => commands::cache::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level`; `RUST_LOG` takes precedence when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
