//! Logging setup for the `schemacompare` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the caller. Output goes to stderr so stdout stays machine readable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::api::Error;

/// Environment variable that overrides the verbosity flags with a full
/// filter directive, e.g. `SCHEMACOMPARE_LOG=schemacompare::diff=trace`.
pub const LOG_ENV_VAR: &str = "SCHEMACOMPARE_LOG";

/// Maps CLI flags to a level: quiet is ERROR, then 0=INFO, 1=DEBUG, 2+=TRACE.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// # Example
/// ```rust,no_run
/// use schemacompare::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<(), Error> {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| Error::logging(e.to_string()))
}
