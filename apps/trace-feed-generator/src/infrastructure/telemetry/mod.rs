//! Telemetry initialization: console tracing on stderr.
//!
//! Stdout is the record stream, so every log line goes to stderr. The
//! filter comes from `RUST_LOG` with an `info` fallback.

use tracing_subscriber::EnvFilter;

/// Initializes the console tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
