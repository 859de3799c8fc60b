//! loginenv CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use loginenv::cli::{Cli, CommandDispatcher};
use loginenv::environment::ResolverOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries command output. Log level is
/// controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("loginenv=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loginenv=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("loginenv starting with args: {:?}", cli);

    let options = ResolverOptions {
        timeout: cli.timeout(),
    };
    let dispatcher = CommandDispatcher::new(options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = dispatcher
        .dispatch(&cli, &mut out)
        .and_then(|result| out.flush().map(|_| result).map_err(Into::into));

    match result {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
