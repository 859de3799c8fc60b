//! Error types for loginenv operations.
//!
//! This module defines [`LoginEnvError`] and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Account lookups never error; a missing record or field is `None`
//! - Login-shell capture failures are `LoginEnvError`s, recovered by the
//!   resolver into the fallback environment
//! - The public queries in the crate root never return an error

use std::time::Duration;
use thiserror::Error;

/// Core error type for loginenv operations.
#[derive(Debug, Error)]
pub enum LoginEnvError {
    /// The shell executable could not be started.
    #[error("Failed to spawn shell '{shell}': {source}")]
    SpawnFailed {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    /// The shell did not exit within the configured timeout.
    #[error("Shell '{shell}' did not exit within {timeout:?}")]
    Timeout { shell: String, timeout: Duration },

    /// The shell exited, but a process outside its process group kept the
    /// output pipes open past the deadline.
    #[error("Shell '{shell}' exited but its output was held open by another process")]
    OutputHeldOpen { shell: String },

    /// The shell exited unsuccessfully.
    #[error("Shell '{shell}' exited with code {code:?}")]
    ShellExited { shell: String, code: Option<i32> },

    /// The shell printed output that is not valid UTF-8.
    #[error("Shell '{shell}' produced non UTF-8 output")]
    InvalidOutput { shell: String },

    /// The shell output contained no environment variables.
    #[error("Shell '{shell}' produced no environment variables")]
    EmptyOutput { shell: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for loginenv operations.
pub type Result<T> = std::result::Result<T, LoginEnvError>;
