//! Environment resolution.
//!
//! Resolves the shell, PATH and HOME from the process environment and the
//! account database, then asks the login shell for its environment:
//! 1. Default overlay (TERM, HOME, PATH) merged under the process environment
//! 2. `<shell> -lc /usr/bin/env` run with that merged environment
//! 3. Parsed shell output, or the merged environment if anything failed

use super::parse::parse_env_text;
use super::snapshot::ProcessEnvironment;
use crate::error::{LoginEnvError, Result};
use crate::shell::dump_login_environment;
use crate::user::{AccountDatabase, SystemAccounts};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Shell used when neither `SHELL` nor the account record names one.
pub const FALLBACK_SHELL: &str = "/bin/bash";

/// PATH used when the process environment has none.
pub const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";

/// TERM injected into the default overlay.
pub const DEFAULT_TERM: &str = "xterm-256color";

/// Directory under which home directories are synthesized.
#[cfg(target_os = "macos")]
pub const HOME_ROOT: &str = "/Users";

/// Directory under which home directories are synthesized.
#[cfg(not(target_os = "macos"))]
pub const HOME_ROOT: &str = "/home";

/// Pick the shell executable.
///
/// `SHELL` wins if non-empty, then the account record's shell, then
/// [`FALLBACK_SHELL`].
pub fn resolve_shell(env: &ProcessEnvironment, accounts: &dyn AccountDatabase) -> String {
    if let Some(shell) = env.get_non_empty("SHELL") {
        return shell.to_string();
    }

    if let Some(shell) = accounts.shell().filter(|s| !s.is_empty()) {
        return shell;
    }

    FALLBACK_SHELL.to_string()
}

/// Pick the baseline PATH.
pub fn resolve_path(env: &ProcessEnvironment) -> String {
    env.get("PATH").unwrap_or(DEFAULT_PATH).to_string()
}

/// Pick the home directory.
///
/// An explicitly empty `HOME` is kept as-is. When nothing usable is found
/// the result is the empty string.
pub fn resolve_home(env: &ProcessEnvironment, accounts: &dyn AccountDatabase) -> String {
    if let Some(home) = env.get("HOME") {
        return home.to_string();
    }

    if let Some(home) = accounts.home_dir().filter(|h| !h.is_empty()) {
        return home;
    }

    if let Some(name) = accounts.intrinsic_user_name().filter(|n| !n.is_empty()) {
        return format!("{}/{}", HOME_ROOT, name);
    }

    if let Some(name) = accounts.user_name().filter(|n| !n.is_empty()) {
        return format!("{}/{}", HOME_ROOT, name);
    }

    String::new()
}

/// The minimal `{TERM, HOME, PATH}` mapping.
pub fn default_overlay(
    env: &ProcessEnvironment,
    accounts: &dyn AccountDatabase,
) -> HashMap<String, String> {
    HashMap::from([
        ("TERM".to_string(), DEFAULT_TERM.to_string()),
        ("HOME".to_string(), resolve_home(env, accounts)),
        ("PATH".to_string(), resolve_path(env)),
    ])
}

/// The process environment laid over the default overlay.
///
/// Process values win; the overlay only fills gaps.
pub fn merged_environment(
    env: &ProcessEnvironment,
    accounts: &dyn AccountDatabase,
) -> HashMap<String, String> {
    let mut merged = default_overlay(env, accounts);
    merged.extend(
        env.vars()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

/// Options for environment resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Maximum time to wait for the login shell (None = wait indefinitely).
    pub timeout: Option<Duration>,
}

/// How the environment was determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvironmentSource {
    /// Parsed from the login shell's output.
    LoginShell { shell: String },
    /// The merged process environment, because the shell could not be used.
    Fallback { shell: String, reason: String },
}

impl std::fmt::Display for EnvironmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginShell { shell } => write!(f, "login shell {}", shell),
            Self::Fallback { reason, .. } => write!(f, "fallback ({})", reason),
        }
    }
}

/// A resolved environment with how it was determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    /// Variable name to value.
    pub variables: HashMap<String, String>,
    /// How the variables were obtained.
    pub source: EnvironmentSource,
}

impl ResolvedEnvironment {
    /// Whether the variables came from the login shell.
    pub fn is_from_login_shell(&self) -> bool {
        matches!(self.source, EnvironmentSource::LoginShell { .. })
    }
}

/// Resolves the user's login environment.
///
/// # Example
///
/// ```
/// use loginenv::environment::{
///     EnvironmentResolver, EnvironmentSource, ProcessEnvironment, ResolverOptions,
/// };
/// use loginenv::user::UserRecord;
///
/// let env = ProcessEnvironment::from_pairs([
///     ("SHELL", "/nonexistent/shell"),
///     ("HOME", "/home/ada"),
/// ]);
/// let resolved = EnvironmentResolver::new(ResolverOptions::default())
///     .resolve_with(&env, &UserRecord::default());
///
/// assert!(matches!(resolved.source, EnvironmentSource::Fallback { .. }));
/// assert_eq!(resolved.variables["HOME"], "/home/ada");
/// assert_eq!(resolved.variables["TERM"], "xterm-256color");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvironmentResolver {
    options: ResolverOptions,
}

impl EnvironmentResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Resolve against the live process environment and account database.
    pub fn resolve(&self) -> ResolvedEnvironment {
        self.resolve_with(&ProcessEnvironment::capture(), &SystemAccounts)
    }

    /// Resolve against the given environment and account database.
    ///
    /// The login shell's parsed output replaces the merged environment
    /// only when it holds at least one variable. A spawn failure, timeout,
    /// non-zero exit, non UTF-8 output, or output with no `KEY=VALUE`
    /// lines all yield the merged environment instead, so HOME, PATH and
    /// TERM are always present.
    pub fn resolve_with(
        &self,
        env: &ProcessEnvironment,
        accounts: &dyn AccountDatabase,
    ) -> ResolvedEnvironment {
        let merged = merged_environment(env, accounts);
        let shell = resolve_shell(env, accounts);

        match self.login_shell_environment(&shell, &merged) {
            Ok(variables) => {
                tracing::debug!("Resolved {} variables from {}", variables.len(), shell);
                ResolvedEnvironment {
                    variables,
                    source: EnvironmentSource::LoginShell { shell },
                }
            }
            Err(e) => {
                tracing::warn!("Using process environment: {}", e);
                ResolvedEnvironment {
                    variables: merged,
                    source: EnvironmentSource::Fallback {
                        shell,
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn login_shell_environment(
        &self,
        shell: &str,
        merged: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        let stdout = dump_login_environment(shell, merged, self.options.timeout)?;

        let text = String::from_utf8(stdout).map_err(|_| LoginEnvError::InvalidOutput {
            shell: shell.to_string(),
        })?;

        let variables = parse_env_text(&text);
        if variables.is_empty() {
            return Err(LoginEnvError::EmptyOutput {
                shell: shell.to_string(),
            });
        }

        Ok(variables)
    }
}
