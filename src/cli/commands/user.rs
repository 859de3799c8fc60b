//! The `user` command.

use std::io::Write;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::UserArgs;
use crate::error::Result;
use crate::user::UserRecord;

/// Prints the account record.
pub struct UserCommand {
    record: Option<UserRecord>,
    args: UserArgs,
}

impl UserCommand {
    pub fn new(record: Option<UserRecord>, args: UserArgs) -> Self {
        Self { record, args }
    }
}

impl Command for UserCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        if self.args.json {
            let json = serde_json::to_string_pretty(&self.record).map_err(std::io::Error::from)?;
            writeln!(out, "{}", json)?;
            return Ok(CommandResult::success());
        }

        let Some(record) = &self.record else {
            writeln!(out, "No account record for the current user")?;
            return Ok(CommandResult::failure(1));
        };

        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());
        writeln!(out, "name:  {}", show(&record.name))?;
        writeln!(out, "home:  {}", show(&record.home_dir))?;
        writeln!(out, "shell: {}", show(&record.shell))?;

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(record: Option<UserRecord>, json: bool) -> (CommandResult, String) {
        let mut out = Vec::new();
        let result = UserCommand::new(record, UserArgs { json })
            .execute(&mut out)
            .unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn prints_fields_and_unset_markers() {
        let record = UserRecord {
            shell: Some("/bin/zsh".into()),
            name: Some("ada".into()),
            home_dir: None,
        };

        let (result, out) = run(Some(record), false);

        assert!(result.success);
        assert!(out.contains("name:  ada"));
        assert!(out.contains("home:  (unset)"));
        assert!(out.contains("shell: /bin/zsh"));
    }

    #[test]
    fn missing_record_fails() {
        let (result, out) = run(None, false);
        assert_eq!(result.exit_code, 1);
        assert!(out.contains("No account record"));
    }

    #[test]
    fn missing_record_is_json_null() {
        let (result, out) = run(None, true);
        assert!(result.success);
        assert_eq!(out.trim(), "null");
    }

    #[test]
    fn json_output_has_fields() {
        let record = UserRecord {
            shell: Some("/bin/zsh".into()),
            name: Some("ada".into()),
            home_dir: Some("/home/ada".into()),
        };

        let (_, out) = run(Some(record), true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["name"], "ada");
        assert_eq!(value["home_dir"], "/home/ada");
        assert_eq!(value["shell"], "/bin/zsh");
    }
}
