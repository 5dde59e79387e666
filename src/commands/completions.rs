//! # Completions Command Implementation
//!
//! Writes a completion script for the requested shell to stdout.
//!
//! ```bash
//! mac-dev-shim completions bash > ~/.local/share/bash-completion/completions/mac-dev-shim
//! mac-dev-shim completions zsh > ~/.zfunc/_mac-dev-shim
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

const BIN_NAME: &str = "mac-dev-shim";

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, elvish, powershell)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, BIN_NAME, &mut io::stdout());
    Ok(())
}
