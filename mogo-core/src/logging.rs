//! Logging setup controlled by environment variables.
//!
//! mogo itself only emits `tracing` events. Applications without their own
//! subscriber can call [`init`] (with the `tracing-subscriber` feature) to get
//! one configured from:
//!
//! - `MOGO_DEBUG=true|1|yes` - enable debug logging
//! - `MOGO_LOG_LEVEL=trace|debug|info|warn|error` - set the level explicitly
//! - `MOGO_LOG_FORMAT=json|pretty|compact` - output format (default: json)

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Enables debug logging.
pub const DEBUG_ENV: &str = "MOGO_DEBUG";
/// Overrides the log level.
pub const LEVEL_ENV: &str = "MOGO_LOG_LEVEL";
/// Selects the output format.
pub const FORMAT_ENV: &str = "MOGO_LOG_FORMAT";

/// Check if `MOGO_DEBUG` is set to "true", "1" or "yes" (case-insensitive).
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// The log level from `MOGO_LOG_LEVEL`, falling back to "debug" when
/// `MOGO_DEBUG` is on and "warn" otherwise.
pub fn get_log_level() -> &'static str {
    resolve_level(env::var(LEVEL_ENV).ok().as_deref(), is_debug_enabled())
}

/// The log format from `MOGO_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    resolve_format(env::var(FORMAT_ENV).ok().as_deref())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Install a global subscriber for mogo's events.
///
/// Does nothing unless `MOGO_DEBUG` or `MOGO_LOG_LEVEL` is set, and only
/// the first call has any effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_ENV).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("mogo={},mogo_core={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "mogo logging initialized"
                );
            }
        }
    });
}
