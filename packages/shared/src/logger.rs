//! Logging setup utilities for the Atelier realtime server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "atelier-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use atelier_shared::logger::setup_logger;
///
/// setup_logger("atelier-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Default filter directives: this crate plus the caller's crate. Tracing
/// targets are module paths, so hyphenated package names must be
/// normalized to underscores or the directive never matches anything.
fn default_directives(binary_name: &str, level: &str) -> String {
    format!(
        "{}={},{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        level,
        binary_name.replace('-', "_"),
        level
    )
}
