//! Prometheus metrics for the mediation bridge.
//!
//! All metrics follow the naming convention: `ad_bridge_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Events handed to the host listener
    pub static ref EVENTS_DELIVERED: CounterVec = CounterVec::new(
        Opts::new("ad_bridge_events_delivered_total", "Normalized events delivered to the listener"),
        &["type", "phase"]
    ).expect("metric creation failed");

    /// Vendor callbacks or events that reached nobody
    pub static ref CALLBACKS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("ad_bridge_callbacks_dropped_total", "Vendor callbacks and events dropped"),
        &["reason"]  // stale_session, torn_down, unknown_unit, no_consumer, ...
    ).expect("metric creation failed");

    /// Calls made into the vendor SDK
    pub static ref CAPABILITY_CALLS: CounterVec = CounterVec::new(
        Opts::new("ad_bridge_capability_calls_total", "Calls made into the vendor SDK"),
        &["operation"]  // initialize, load, show, pause, resume
    ).expect("metric creation failed");

    /// Host usage errors (bad tags, missing key, calls before init)
    pub static ref USAGE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ad_bridge_usage_errors_total", "Host calls rejected as usage errors"),
        &["operation"]
    ).expect("metric creation failed");

    /// Ad units alive in the current session
    pub static ref ACTIVE_AD_UNITS: Gauge = Gauge::new(
        "ad_bridge_active_ad_units",
        "Ad units constructed for the current session"
    ).expect("metric creation failed");
}

/// Handle to the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_DELIVERED.clone()),
        Box::new(CALLBACKS_DROPPED.clone()),
        Box::new(CAPABILITY_CALLS.clone()),
        Box::new(USAGE_ERRORS.clone()),
        Box::new(ACTIVE_AD_UNITS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Render the registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
