//! # Mediation Simulator
//!
//! Runs one scripted session against the simulated SDK and prints every
//! event as the host table a scripting runtime would receive.
//!
//! ```text
//! AD_SDK_GENERATION=static cargo run --bin mediation-sim
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::time::timeout;
use tracing::{info, warn};

use ad_event_sink::{channel, EventStream};
use ad_types::{AdType, EventPhase, EventType, ShowOptions};
use ad_unit::SdkGeneration;
use mediation_bridge::{BridgeConfig, MediationBridge, SimulatedSdk};
use mediation_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

const VENDOR_LATENCY: Duration = Duration::from_millis(50);
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env()).context("telemetry setup failed")?;

    let config = BridgeConfig::from_env()?;
    let generation = match env::var("AD_SDK_GENERATION") {
        Ok(value) => value.parse::<SdkGeneration>().map_err(|e| anyhow!(e))?,
        Err(_) => SdkGeneration::AdUnitObjects,
    };
    info!(generation = %generation, "Starting mediation simulator");

    let sdk = SimulatedSdk::with_autopilot(generation, VENDOR_LATENCY);
    let bridge = MediationBridge::spawn(Arc::new(sdk), config);

    let (consumer, mut events) = channel();
    bridge.init_from_host_table(
        &serde_json::json!({
            "key": "demo-app-key",
            "interstitialAdUnitId": "demo-interstitial",
            "rewardedVideoAdUnitId": "demo-rewarded",
            "hasUserConsent": true,
            "showDebugLog": true,
        }),
        consumer,
    )?;

    wait_for(&mut events, |t, p| t == EventType::Init && p == EventPhase::Success).await?;

    for ad_type in AdType::ALL {
        wait_until_available(&bridge, &mut events, ad_type).await?;
        bridge.show(ad_type, ShowOptions::placement("DefaultPlacement"))?;
        wait_for(&mut events, |t, p| t == EventType::Ad(ad_type) && p == EventPhase::Closed).await?;
    }

    bridge.shutdown().await;
    println!("{}", encode_metrics()?);
    Ok(())
}

/// Print events until one matches `done`.
async fn wait_for<F>(events: &mut EventStream, done: F) -> Result<()>
where
    F: Fn(EventType, EventPhase) -> bool,
{
    loop {
        let event = timeout(EVENT_TIMEOUT, events.recv())
            .await
            .context("timed out waiting for an event")?
            .ok_or_else(|| anyhow!("listener released"))?;
        println!("{}", event.to_host_table());
        if event.event_type == EventType::Init && event.is_error {
            return Err(anyhow!("init failed: {}", event.detail.unwrap_or_default()));
        }
        if done(event.event_type, event.phase) {
            return Ok(());
        }
    }
}

async fn wait_until_available(
    bridge: &MediationBridge,
    events: &mut EventStream,
    ad_type: AdType,
) -> Result<()> {
    if !bridge.is_available(ad_type) {
        wait_for(events, |t, p| {
            t == EventType::Ad(ad_type) && matches!(p, EventPhase::Loaded | EventPhase::Available)
        })
        .await?;
    }
    bridge.flush().await?;
    if !bridge.is_available(ad_type) {
        warn!(ad_type = %ad_type, "Still not available after load");
    }
    Ok(())
}
