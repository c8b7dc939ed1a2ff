//! Fixtures shared by the integration tests.

use std::sync::Arc;
use std::time::Duration;

use ad_event_sink::{channel, EventStream};
use ad_types::{InitOptions, NormalizedEvent, SessionId, VendorCallback};
use ad_unit::{AdSdkCapability, InitHandshake, SdkGeneration};
use mediation_bridge::{BridgeConfig, MediationBridge, SimulatedSdk};
use tokio::time::timeout;

/// Upper bound for anything awaited in a test.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(2);

/// A bridge wired to a simulated SDK, plus the listener's event stream.
pub struct Harness {
    pub bridge: MediationBridge,
    pub sdk: SimulatedSdk,
    pub events: EventStream,
    pub session: SessionId,
}

/// Init options with key "K", interstitial "I" and rewarded "R".
pub fn full_options() -> InitOptions {
    InitOptions::with_app_key("K").interstitial("I").rewarded("R")
}

/// A bridge over `sdk` with the default configuration.
pub fn bridge_for(sdk: &SimulatedSdk) -> MediationBridge {
    MediationBridge::spawn(Arc::new(sdk.clone()), BridgeConfig::default())
}

impl Harness {
    /// Init with `options` and wait for the init handshake to finish.
    ///
    /// For asynchronous generations the simulated vendor reports completion.
    pub async fn start(generation: SdkGeneration, options: InitOptions) -> Self {
        Self::start_with(SimulatedSdk::new(generation), BridgeConfig::default(), options).await
    }

    pub async fn start_with(sdk: SimulatedSdk, config: BridgeConfig, options: InitOptions) -> Self {
        let bridge = MediationBridge::spawn(Arc::new(sdk.clone()), config);
        let (consumer, events) = channel();
        let session = bridge.init(options, consumer).expect("init rejected");
        let mut harness = Self {
            bridge,
            sdk,
            events,
            session,
        };
        harness.settle().await;

        if harness.sdk.profile().init_handshake == InitHandshake::Asynchronous {
            harness.vendor(VendorCallback::InitCompleted).await;
        }
        harness
    }

    /// Wait for the runtime to handle everything sent so far.
    pub async fn settle(&self) {
        timeout(STEP_TIMEOUT, self.bridge.flush())
            .await
            .expect("runtime stalled")
            .expect("runtime shut down");
    }

    /// Fire a vendor callback and wait for it to be handled.
    pub async fn vendor(&mut self, callback: VendorCallback) {
        assert!(self.sdk.fire(callback), "no callback sink");
        self.settle().await;
    }

    /// Everything the listener has received so far.
    pub fn take_events(&mut self) -> Vec<NormalizedEvent> {
        self.events.drain()
    }

    /// Wait for the next event.
    pub async fn next_event(&mut self) -> NormalizedEvent {
        timeout(STEP_TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("listener released")
    }
}
