//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::LogLevel;

/// Picks the filter directive for the given flags. `--log` wins over
/// `--quiet` and `--verbose`.
pub fn filter_directive(quiet: bool, verbose: bool, level: Option<LogLevel>) -> &'static str {
    match level {
        Some(LogLevel::Error) => "error",
        Some(LogLevel::Warn) => "warn",
        Some(LogLevel::Info) => "info",
        Some(LogLevel::Debug) => "debug",
        Some(LogLevel::Trace) => "trace",
        None if quiet => "error",
        None if verbose => "debug",
        None => "info",
    }
}

/// Installs a stderr fmt layer filtered by the CLI flags.
pub fn setup_logging(
    quiet: bool,
    verbose: bool,
    level: Option<LogLevel>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::new(filter_directive(quiet, verbose, level));
    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .try_init()?;
    Ok(())
}
