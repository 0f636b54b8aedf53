//! Log output for the command-line application.
//!
//! Logs go to stderr so that command results written to stdout can be piped
//! elsewhere.

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// The environment variable that overrides the log level given on the
/// command line, e.g. `RUST_LOG=expense_tracker=debug`.
pub const LOG_FILTER_ENV_VAR: &str = "RUST_LOG";

/// Install the global tracing subscriber.
///
/// `default_level` applies to every target unless [LOG_FILTER_ENV_VAR] holds
/// more specific directives.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn setup_logging(default_level: LevelFilter) {
    let directives = std::env::var(LOG_FILTER_ENV_VAR).ok();

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(build_filter(default_level, directives.as_deref())))
        .init();
}

fn build_filter(default_level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives.unwrap_or_default())
}
