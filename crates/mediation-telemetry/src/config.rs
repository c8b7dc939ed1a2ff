//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to emit logs at all
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ad-mediation".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AD_SERVICE_NAME`: Service name (default: ad-mediation)
    /// - `AD_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `AD_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `AD_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("AD_SERVICE_NAME")
                .unwrap_or_else(|_| "ad-mediation".to_string()),

            log_level: env::var("AD_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("AD_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("AD_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Raise the filter to `debug` for the bridge crates, as requested by the
    /// host's `showDebugLog` option.
    #[must_use]
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        if enabled {
            self.log_level = format!(
                "{},ad_unit=debug,ad_event_sink=debug,mediation_bridge=debug",
                self.log_level
            );
        }
        self
    }
}
