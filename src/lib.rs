//! loginenv - Discover a user's login shell environment.
//!
//! Processes launched from a GUI or a service manager often inherit a
//! sparse environment. loginenv works out what a terminal session would
//! have: it consults the process environment and the account database to
//! pick a shell, PATH and HOME, then runs the shell as a login shell and
//! reads back its environment.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`environment`] - Shell/PATH/HOME resolution and `env` output parsing
//! - [`error`] - Error types and result aliases
//! - [`shell`] - Child process capture
//! - [`user`] - Account database lookup
//!
//! # Example
//!
//! ```
//! use loginenv::environment::parse_env_text;
//!
//! let env = parse_env_text("PATH=/usr/bin\nHOME=/home/ada\n");
//! assert_eq!(env["HOME"], "/home/ada");
//! ```
//!
//! None of the queries below can fail; each falls back to a best-effort
//! answer.

use std::collections::HashMap;

pub mod cli;
pub mod environment;
pub mod error;
pub mod shell;
pub mod user;

pub use error::{LoginEnvError, Result};

use environment::{EnvironmentResolver, ProcessEnvironment};
use user::SystemAccounts;

/// The shell executable used for environment discovery.
pub fn shell_executable_path() -> String {
    environment::resolve_shell(&ProcessEnvironment::capture(), &SystemAccounts)
}

/// The baseline PATH.
pub fn path() -> String {
    environment::resolve_path(&ProcessEnvironment::capture())
}

/// The user's home directory, or an empty string if none can be found.
pub fn home_path() -> String {
    environment::resolve_home(&ProcessEnvironment::capture(), &SystemAccounts)
}

/// The user's login environment.
///
/// Spawns the login shell once and waits for it without a timeout. Use
/// [`EnvironmentResolver`] to bound the wait or to learn whether the
/// shell was actually used.
pub fn user_environment() -> HashMap<String, String> {
    EnvironmentResolver::default().resolve().variables
}
