//! The `env` command.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::EnvArgs;
use crate::environment::{
    EnvironmentResolver, EnvironmentSource, ProcessEnvironment, ResolverOptions,
};
use crate::error::Result;
use crate::user::AccountDatabase;

/// Resolves and prints the login environment, sorted by name.
pub struct EnvCommand<'a> {
    env: &'a ProcessEnvironment,
    accounts: &'a dyn AccountDatabase,
    options: ResolverOptions,
    args: EnvArgs,
}

#[derive(Serialize)]
struct EnvReport<'a> {
    source: &'a EnvironmentSource,
    variables: BTreeMap<&'a str, &'a str>,
}

impl<'a> EnvCommand<'a> {
    pub fn new(
        env: &'a ProcessEnvironment,
        accounts: &'a dyn AccountDatabase,
        options: ResolverOptions,
        args: EnvArgs,
    ) -> Self {
        Self {
            env,
            accounts,
            options,
            args,
        }
    }
}

impl Command for EnvCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let resolved =
            EnvironmentResolver::new(self.options.clone()).resolve_with(self.env, self.accounts);

        let variables: BTreeMap<&str, &str> = resolved
            .variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        if self.args.json {
            let report = EnvReport {
                source: &resolved.source,
                variables,
            };
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
            writeln!(out, "{}", json)?;
        } else if self.args.keys_only {
            for key in variables.keys() {
                writeln!(out, "{}", key)?;
            }
        } else {
            for (key, value) in &variables {
                writeln!(out, "{}={}", key, value)?;
            }
        }

        if self.args.strict && !resolved.is_from_login_shell() {
            tracing::error!("Login shell unavailable: {}", resolved.source);
            return Ok(CommandResult::failure(1));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRecord;

    fn run(args: EnvArgs) -> (CommandResult, String) {
        let env = ProcessEnvironment::from_pairs([
            ("SHELL", "/nonexistent/shell"),
            ("ZED", "last"),
            ("ALPHA", "first"),
        ]);
        let accounts = UserRecord {
            shell: None,
            name: Some("ada".into()),
            home_dir: Some("/home/ada".into()),
        };
        let mut out = Vec::new();
        let result = EnvCommand::new(&env, &accounts, ResolverOptions::default(), args)
            .execute(&mut out)
            .unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn prints_sorted_pairs() {
        let (result, out) = run(EnvArgs::default());
        let lines: Vec<&str> = out.lines().collect();

        assert!(result.success);
        assert_eq!(lines.first(), Some(&"ALPHA=first"));
        assert_eq!(lines.last(), Some(&"ZED=last"));
        assert!(lines.contains(&"HOME=/home/ada"));
        assert!(lines.contains(&"TERM=xterm-256color"));
    }

    #[test]
    fn keys_only_omits_values() {
        let (_, out) = run(EnvArgs {
            keys_only: true,
            ..Default::default()
        });

        assert!(out.lines().any(|l| l == "PATH"));
        assert!(!out.contains('='));
    }

    #[test]
    fn json_reports_fallback_source() {
        let (_, out) = run(EnvArgs {
            json: true,
            ..Default::default()
        });
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["source"]["kind"], "fallback");
        assert_eq!(value["source"]["shell"], "/nonexistent/shell");
        assert_eq!(value["variables"]["HOME"], "/home/ada");
    }

    #[test]
    fn strict_fails_but_still_prints() {
        let (result, out) = run(EnvArgs {
            strict: true,
            ..Default::default()
        });

        assert_eq!(result.exit_code, 1);
        assert!(out.contains("PATH="));
    }
}
