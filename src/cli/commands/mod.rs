//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`].

pub mod dispatcher;
pub mod env;
pub mod query;
pub mod user;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
