//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cli::args::{Cli, Commands, EnvArgs};
use crate::environment::{ProcessEnvironment, ResolverOptions};
use crate::error::Result;
use crate::user::{AccountDatabase, SystemAccounts, UserRecord};

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing its output to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: ResolverOptions,
    env: ProcessEnvironment,
    accounts: Box<dyn AccountDatabase>,
}

impl CommandDispatcher {
    /// Create a dispatcher over the live process environment and account database.
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_sources(
            options,
            ProcessEnvironment::capture(),
            Box::new(SystemAccounts),
        )
    }

    /// Create a dispatcher over explicit sources.
    pub fn with_sources(
        options: ResolverOptions,
        env: ProcessEnvironment,
        accounts: Box<dyn AccountDatabase>,
    ) -> Self {
        Self {
            options,
            env,
            accounts,
        }
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        let accounts = self.accounts.as_ref();

        match &cli.command {
            Some(Commands::Env(args)) => self.env_command(args.clone()).execute(out),
            Some(Commands::Shell) => {
                super::query::QueryCommand::shell(&self.env, accounts).execute(out)
            }
            Some(Commands::Path) => super::query::QueryCommand::path(&self.env).execute(out),
            Some(Commands::Home) => {
                super::query::QueryCommand::home(&self.env, accounts).execute(out)
            }
            Some(Commands::User(args)) => {
                super::user::UserCommand::new(UserRecord::current(), args.clone()).execute(out)
            }
            None => self.env_command(EnvArgs::default()).execute(out),
        }
    }

    fn env_command(&self, args: EnvArgs) -> super::env::EnvCommand<'_> {
        super::env::EnvCommand::new(
            &self.env,
            self.accounts.as_ref(),
            self.options.clone(),
            args,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::with_sources(
            ResolverOptions::default(),
            ProcessEnvironment::from_pairs([
                ("SHELL", "/nonexistent/shell"),
                ("HOME", "/home/ada"),
            ]),
            Box::new(UserRecord {
                shell: Some("/bin/fish".into()),
                name: Some("ada".into()),
                home_dir: Some("/home/ada".into()),
            }),
        )
    }

    fn run(args: &[&str]) -> (CommandResult, String) {
        let cli = Cli::parse_from(args);
        let mut out = Vec::new();
        let result = dispatcher().dispatch(&cli, &mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatches_shell() {
        let (result, out) = run(&["loginenv", "shell"]);
        assert!(result.success);
        assert_eq!(out, "/nonexistent/shell\n");
    }

    #[test]
    fn dispatches_home() {
        let (_, out) = run(&["loginenv", "home"]);
        assert_eq!(out, "/home/ada\n");
    }

    #[test]
    fn dispatches_path_default() {
        let (_, out) = run(&["loginenv", "path"]);
        assert_eq!(out.trim_end(), crate::environment::DEFAULT_PATH);
    }

    #[test]
    fn no_subcommand_prints_environment() {
        let (result, out) = run(&["loginenv"]);
        assert!(result.success);
        assert!(out.lines().any(|l| l == "HOME=/home/ada"));
        assert!(out.lines().any(|l| l == "TERM=xterm-256color"));
    }

    #[test]
    fn strict_env_fails_on_fallback() {
        let (result, _) = run(&["loginenv", "env", "--strict"]);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }
}
