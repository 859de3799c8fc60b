//! Login environment discovery.
//!
//! Determines the environment a login shell would hand to its children.
//! The resolution chain is:
//!
//! 1. Default overlay (TERM, HOME, PATH) filled in under the process environment
//! 2. The login shell's own `env` dump, if it can be run and parsed
//! 3. Otherwise the merged environment from step 1

pub mod parse;
pub mod resolver;
pub mod snapshot;

pub use parse::{parse_env_output, parse_env_text};
pub use resolver::{
    default_overlay, merged_environment, resolve_home, resolve_path, resolve_shell,
    EnvironmentResolver, EnvironmentSource, ResolvedEnvironment, ResolverOptions, DEFAULT_PATH,
    DEFAULT_TERM, FALLBACK_SHELL, HOME_ROOT,
};
pub use snapshot::ProcessEnvironment;
