//! Logging setup and log category targets.
//!
//! Every log event carries one of the targets below so categories can be
//! filtered independently through the configuration. Logging is best-effort:
//! installing the subscriber never fails the caller.

use tracing_subscriber::EnvFilter;

use crate::config::{LogCategory, LoggingConfig};

pub const GENERAL: &str = "fences::general";
pub const CREATION: &str = "fences::creation";
pub const UPDATE: &str = "fences::update";
pub const UI: &str = "fences::ui";
pub const ICONS: &str = "fences::icons";
pub const MIGRATION: &str = "fences::migration";
pub const SETTINGS: &str = "fences::settings";
pub const PERFORMANCE: &str = "fences::performance";

/// Builds the filter directives for a logging configuration.
///
/// The configured level applies globally; every disabled category gets an
/// explicit `=off` directive.
#[must_use]
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = vec![config.level.directive().to_string()];

    for category in LogCategory::ALL {
        if !config.is_enabled(category) {
            directives.push(format!("{}=off", category.target()));
        }
    }

    directives.join(",")
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG`, when set, takes precedence over the configuration. Calling
/// this more than once is harmless.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
