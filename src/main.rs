//! hvc - copies secrets between HashiCorp Vault servers by freshness.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hvc::cli::output;
use hvc::cli::{execute, Cli};
use hvc::core::constants::LOG_ENV;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("hvc=debug")
        } else {
            EnvFilter::new("hvc=warn")
        }
    });

    // Logs go to stderr so command output on stdout stays clean.
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
