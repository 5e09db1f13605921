//! Logging setup - structured diagnostics via `tracing`
//!
//! The core only emits events; hosts decide where they go by calling
//! [`init`] once at startup. Secrets are never part of any event. Identity
//! keys are, since they are what an operator searches for.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Pick the default level for a host
pub fn default_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Build the filter: `RUST_LOG` if set, otherwise the given level
pub fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install a stderr fmt subscriber
///
/// Returns `false` if a global subscriber was already installed (e.g. by a
/// test harness); that is not an error.
pub fn init(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level(verbose)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
