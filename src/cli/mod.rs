//! Command-line interface.

pub mod completions;
pub mod copy;
pub mod output;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// hvc - efficiently copies secrets from one or more source Vaults to a target Vault.
#[derive(Parser)]
#[command(
    name = "hvc",
    about = "Efficiently copies secrets from one or more source Vaults to a target Vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Copies secrets according to a copy job specification
    Copy {
        /// Path to the copy job specification (JSON, or TOML with a .toml extension)
        job: PathBuf,
        /// Report stale secrets without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Checks a copy job specification without contacting any Vault
    Validate {
        /// Path to the copy job specification
        job: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    match command {
        Command::Copy { job, dry_run } => copy::execute(&job, dry_run),
        Command::Validate { job } => validate::execute(&job),
        Command::Completions { shell } => completions::execute(shell),
    }
}
