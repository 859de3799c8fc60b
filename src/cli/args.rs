//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::time::Duration;

/// loginenv - Discover a user's login shell environment.
#[derive(Debug, Parser)]
#[command(name = "loginenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Seconds to wait for the login shell before falling back
    #[arg(long, global = true, env = "LOGINENV_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The login shell timeout, if one was given.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved login environment (default if no command specified)
    Env(EnvArgs),

    /// Print the shell used for environment discovery
    Shell,

    /// Print the baseline PATH
    Path,

    /// Print the home directory
    Home,

    /// Print the current user's account record
    User(UserArgs),
}

/// Arguments for the `env` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EnvArgs {
    /// Output as JSON, including how the environment was obtained
    #[arg(long)]
    pub json: bool,

    /// Print variable names only
    #[arg(long, conflicts_with = "json")]
    pub keys_only: bool,

    /// Exit with an error if the login shell could not be used
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `user` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UserArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
