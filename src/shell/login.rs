//! Login shell invocation.

use super::command::{capture_output, CaptureOptions};
use crate::error::{LoginEnvError, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Flags that make a POSIX shell act as a login shell and run one command.
pub const LOGIN_FLAGS: &str = "-lc";

/// The command run inside the login shell to dump its environment.
pub const ENV_DUMP_COMMAND: &str = "/usr/bin/env";

/// Run `<shell> -lc /usr/bin/env` and return its raw stdout.
///
/// `env` becomes the child's entire environment. A non-zero exit status
/// is reported as [`LoginEnvError::ShellExited`].
pub fn dump_login_environment(
    shell: &str,
    env: &HashMap<String, String>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let options = CaptureOptions {
        env: env.clone(),
        timeout,
    };

    let output = capture_output(shell, &[LOGIN_FLAGS, ENV_DUMP_COMMAND], &options)?;

    if !output.success {
        if !output.stderr.is_empty() {
            tracing::debug!(
                "{} stderr: {}",
                shell,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }
        return Err(LoginEnvError::ShellExited {
            shell: shell.to_string(),
            code: output.exit_code,
        });
    }

    Ok(output.stdout)
}
