//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use waymark_cli::CliError;

const LOG_ENV: &str = "WAYMARK_LOG";

#[expect(clippy::print_stderr, reason = "report fatal errors to the user")]
fn main() {
    init_logging();
    if let Err(err) = waymark_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("waymark: {err}");
        std::process::exit(1);
    }
}

/// Route `log` records and spans to stderr, filtered by `WAYMARK_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
