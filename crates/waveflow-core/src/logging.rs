//! Logging configuration consumed by the binary's tracing setup.

use serde::{Deserialize, Serialize};

/// Log output configuration.
///
/// The binary builds its `tracing-subscriber` layers from this; `RUST_LOG`
/// still overrides the configured level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level: trace, debug, info, warn or error
    pub level: String,
    /// Emit logs to stderr
    pub console_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO when invalid.
    pub fn parse_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}
