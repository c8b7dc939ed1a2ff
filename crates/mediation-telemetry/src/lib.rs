//! # Mediation Telemetry
//!
//! Logging and metrics for the ad mediation bridge.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by a `tracing-subscriber` fmt layer,
//!   pretty for development or JSON for log shippers
//! - **Metrics**: Prometheus counters for delivered events, dropped vendor
//!   callbacks and SDK calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediation_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! The bridge crates only emit `tracing` events and bump counters; installing
//! a subscriber is left to the host binary.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AD_SERVICE_NAME` | `ad-mediation` | Service name in logs |
//! | `AD_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `AD_JSON_LOGS` | `false` | JSON formatted logs |
//! | `AD_CONSOLE_OUTPUT` | `true` | Emit logs at all |

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, ACTIVE_AD_UNITS, CALLBACKS_DROPPED,
    CAPABILITY_CALLS, EVENTS_DELIVERED, USAGE_ERRORS,
};
pub use tracing_setup::{init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let tracing_guard = init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
