//! Shell process execution.

pub mod command;
pub mod login;

pub use command::{capture_output, CaptureOptions, CapturedOutput};
pub use login::{dump_login_environment, ENV_DUMP_COMMAND, LOGIN_FLAGS};
