//! Logging initialization
//!
//! Sets up the tracing subscriber once at startup. The level comes from the
//! `[server] log_level` config entry; `RUST_LOG` still wins when set.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system with the configured level
///
/// Unknown levels fall back to "info".
pub fn init_logging(log_level: &str) {
    let level = match log_level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
