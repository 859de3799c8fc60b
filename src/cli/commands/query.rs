//! The `shell`, `path` and `home` commands.

use std::io::Write;

use super::dispatcher::{Command, CommandResult};
use crate::environment::{resolve_home, resolve_path, resolve_shell, ProcessEnvironment};
use crate::error::Result;
use crate::user::AccountDatabase;

/// Prints one resolved value on its own line.
pub struct QueryCommand {
    value: String,
}

impl QueryCommand {
    pub fn shell(env: &ProcessEnvironment, accounts: &dyn AccountDatabase) -> Self {
        Self {
            value: resolve_shell(env, accounts),
        }
    }

    pub fn path(env: &ProcessEnvironment) -> Self {
        Self {
            value: resolve_path(env),
        }
    }

    pub fn home(env: &ProcessEnvironment, accounts: &dyn AccountDatabase) -> Self {
        Self {
            value: resolve_home(env, accounts),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Command for QueryCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        writeln!(out, "{}", self.value)?;
        Ok(CommandResult::success())
    }
}
