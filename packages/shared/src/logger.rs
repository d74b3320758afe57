//! Logging setup utilities for the TempVoice bot.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose spans and events are enabled at the default level.
const TRACED_CRATES: [&str; 3] = ["tempvoice_shared", "tempvoice_bot", "tower_http"];

/// Build the default filter directive for `binary_name` at `default_log_level`.
///
/// Binary names use `-` while tracing targets use `_`, so the name is normalised.
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    TRACED_CRATES
        .iter()
        .copied()
        .chain(std::iter::once(binary_target.as_str()))
        .map(|target| format!("{target}={default_log_level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "tempvoice-bot")
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use tempvoice_shared::logger::setup_logger;
///
/// setup_logger("tempvoice-bot", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
