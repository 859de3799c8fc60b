//! Command-line interface for loginenv.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, EnvArgs, UserArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
