//! # Host Flows
//!
//! End-to-end scenarios as a scripting host sees them:
//!
//! 1. **Init**: `init/success` precedes every ad event
//! 2. **Load**: vendor load completion becomes `loaded` and flips `isAvailable`
//! 3. **Show**: `show`, `reward`, `closed`, then an automatic reload
//! 4. **Not ready**: show outside `Ready` reports an error without reaching the SDK
//! 5. **Re-init**: the old listener is released and never hears the old session again

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ad_event_sink::{channel, EventConsumer};
    use ad_types::{
        AdType, AdUnitId, EventPhase, EventType, InitOptions, NormalizedEvent, ShowOptions,
        VendorCallback, VendorError,
    };
    use ad_unit::{AdUnitState, SdkGeneration};
    use mediation_bridge::{BridgeError, SdkCall, SimulatedSdk};
    use parking_lot::Mutex;

    use crate::integration::harness::{bridge_for, full_options, Harness};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Listener that records events and counts releases.
    #[derive(Clone, Default)]
    struct RecordingListener {
        events: Arc<Mutex<Vec<NormalizedEvent>>>,
        releases: Arc<AtomicUsize>,
    }

    impl EventConsumer for RecordingListener {
        fn on_event(&self, event: &NormalizedEvent) {
            self.events.lock().push(event.clone());
        }

        fn on_release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn unit(id: &str) -> AdUnitId {
        AdUnitId::new(id).expect("non-empty id")
    }

    // =============================================================================
    // INIT
    // =============================================================================

    /// init with key "K" and interstitial "I"; vendor reports init success
    /// then loaded for "I".
    #[tokio::test]
    async fn test_init_then_interstitial_loaded() {
        let mut h = Harness::start(
            SdkGeneration::AdUnitObjects,
            InitOptions::with_app_key("K").interstitial("I"),
        )
        .await;

        h.vendor(VendorCallback::Loaded(unit("I").into())).await;

        let events = h.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], NormalizedEvent::init_success());
        assert_eq!(events[1].event_type, EventType::Ad(AdType::Interstitial));
        assert_eq!(events[1].phase, EventPhase::Loaded);
        assert!(!events[1].is_error);
        assert!(h.bridge.is_available(AdType::Interstitial));
        assert!(!h.bridge.is_available(AdType::RewardedVideo));
    }

    /// An empty key produces a usage error, no event, and no ad unit.
    #[tokio::test]
    async fn test_empty_key_is_usage_error() {
        let sdk = SimulatedSdk::new(SdkGeneration::AdUnitObjects);
        let bridge = bridge_for(&sdk);
        let listener = RecordingListener::default();

        let result = bridge.init(InitOptions::with_app_key("").interstitial("I"), listener.clone());
        assert!(matches!(result, Err(BridgeError::Config(_))));

        bridge.flush().await.unwrap();
        assert!(listener.events.lock().is_empty());
        assert_eq!(bridge.unit_state(AdType::Interstitial).await, Ok(None));
        assert_eq!(sdk.count(|c| matches!(c, SdkCall::Initialize { .. })), 0);
    }

    /// Nothing reaches the listener before init completes.
    #[tokio::test]
    async fn test_no_events_before_init_complete() {
        let sdk = SimulatedSdk::new(SdkGeneration::PerUnitListener);
        let bridge = bridge_for(&sdk);
        let (consumer, mut events) = channel();
        bridge.init(full_options(), consumer).unwrap();
        bridge.flush().await.unwrap();

        sdk.fire(VendorCallback::Loaded(AdType::Interstitial.into()));
        sdk.fire(VendorCallback::ShowSucceeded(AdType::Interstitial.into()));
        sdk.fire(VendorCallback::Closed(AdType::Interstitial.into()));
        bridge.show(AdType::Interstitial, ShowOptions::default()).unwrap();
        bridge.flush().await.unwrap();
        assert!(events.drain().is_empty());

        sdk.fire(VendorCallback::InitCompleted);
        bridge.flush().await.unwrap();
        assert_eq!(events.drain(), vec![NormalizedEvent::init_success()]);
    }

    /// Vendor init failure reaches the listener with message and code.
    #[tokio::test]
    async fn test_init_failure_reported_with_code() {
        let sdk = SimulatedSdk::new(SdkGeneration::AdUnitObjects);
        let bridge = bridge_for(&sdk);
        let (consumer, mut events) = channel();
        bridge.init(full_options(), consumer).unwrap();
        bridge.flush().await.unwrap();

        sdk.fire(VendorCallback::InitFailed(VendorError::new(
            508,
            "Init failed - appKey is invalid",
        )));
        bridge.flush().await.unwrap();

        let event = events.try_recv().expect("init event");
        assert_eq!(event.event_type, EventType::Init);
        assert_eq!(event.phase, EventPhase::Failed);
        assert!(event.is_error);
        assert_eq!(
            event.detail.as_deref(),
            Some("Init failed - appKey is invalid (code 508)")
        );

        bridge.load(AdType::Interstitial).unwrap();
        bridge.flush().await.unwrap();
        assert_eq!(sdk.loads(AdType::Interstitial), 0);
        assert!(!bridge.is_available(AdType::Interstitial));
    }

    // =============================================================================
    // LOAD / SHOW
    // =============================================================================

    /// Show while loading: `not ready`, and the SDK never sees a show.
    #[tokio::test]
    async fn test_show_while_loading_reports_not_ready() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.take_events();
        assert_eq!(
            h.bridge.unit_state(AdType::Interstitial).await,
            Ok(Some(AdUnitState::Loading))
        );

        h.bridge.show(AdType::Interstitial, ShowOptions::default()).unwrap();
        h.bridge.show(AdType::RewardedVideo, ShowOptions::default()).unwrap();
        h.settle().await;

        let events = h.take_events();
        assert_eq!(
            events,
            vec![
                NormalizedEvent::not_ready(AdType::Interstitial),
                NormalizedEvent::not_ready(AdType::RewardedVideo),
            ]
        );
        assert_eq!(events[0].detail.as_deref(), Some("not ready"));
        assert_eq!(events[1].detail.as_deref(), Some("not available"));
        assert_eq!(h.sdk.count(|c| matches!(c, SdkCall::Show { .. })), 0);
    }

    /// Ready → Showing → Closed → Loading for rewarded video.
    #[tokio::test]
    async fn test_rewarded_show_close_reload() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.sdk.complete_load(AdType::RewardedVideo);
        h.settle().await;
        assert_eq!(
            h.bridge.unit_state(AdType::RewardedVideo).await,
            Ok(Some(AdUnitState::Ready))
        );
        h.take_events();

        h.bridge
            .show(AdType::RewardedVideo, ShowOptions::placement("Home"))
            .unwrap();
        h.settle().await;
        assert_eq!(
            h.bridge.unit_state(AdType::RewardedVideo).await,
            Ok(Some(AdUnitState::Showing))
        );

        h.vendor(VendorCallback::ShowSucceeded(unit("R").into())).await;
        h.vendor(VendorCallback::Closed(unit("R").into())).await;

        let phases: Vec<EventPhase> = h.take_events().iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![EventPhase::Show, EventPhase::Closed]);
        assert_eq!(
            h.bridge.unit_state(AdType::RewardedVideo).await,
            Ok(Some(AdUnitState::Loading))
        );
        assert_eq!(h.sdk.loads(AdType::RewardedVideo), 2);
        assert!(!h.bridge.is_available(AdType::RewardedVideo));
    }

    /// A close that follows no show is dropped: the loaded ad survives and
    /// no second load is issued.
    #[tokio::test]
    async fn test_close_without_show_keeps_loaded_ad() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.vendor(VendorCallback::Closed(unit("R").into())).await;
        assert_eq!(h.sdk.loads(AdType::RewardedVideo), 1);

        h.sdk.complete_load(AdType::RewardedVideo);
        h.settle().await;
        h.take_events();

        h.vendor(VendorCallback::Closed(unit("R").into())).await;
        assert!(h.take_events().is_empty());
        assert!(h.bridge.is_available(AdType::RewardedVideo));
        assert_eq!(
            h.bridge.unit_state(AdType::RewardedVideo).await,
            Ok(Some(AdUnitState::Ready))
        );
        assert_eq!(h.sdk.loads(AdType::RewardedVideo), 1);
    }

    /// Reward events carry the reward name; no ordering against `closed`.
    #[tokio::test]
    async fn test_reward_after_close_still_delivered() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.sdk.complete_load(AdType::RewardedVideo);
        h.settle().await;
        h.bridge
            .show(AdType::RewardedVideo, ShowOptions::default())
            .unwrap();
        h.settle().await;
        h.take_events();

        h.vendor(VendorCallback::Closed(unit("R").into())).await;
        h.vendor(VendorCallback::Rewarded {
            target: unit("R").into(),
            reward: ad_types::RewardPayload::Reward {
                name: "Gems".into(),
                amount: 5,
            },
        })
        .await;

        let events = h.take_events();
        assert_eq!(events[0].phase, EventPhase::Closed);
        assert_eq!(events[1].phase, EventPhase::Reward);
        assert_eq!(events[1].detail.as_deref(), Some("Gems"));
    }

    /// Repeated loads while loading produce one SDK load.
    #[tokio::test]
    async fn test_repeated_load_is_idempotent() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        for _ in 0..3 {
            h.bridge.load(AdType::Interstitial).unwrap();
        }
        h.settle().await;
        assert_eq!(h.sdk.loads(AdType::Interstitial), 1);

        h.sdk.complete_load(AdType::Interstitial);
        h.bridge.load_tag("interstitial").unwrap();
        h.settle().await;
        assert_eq!(h.sdk.loads(AdType::Interstitial), 1);
    }

    /// A failed load is retried by the next explicit load.
    #[tokio::test]
    async fn test_load_failure_then_retry() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.take_events();

        h.vendor(VendorCallback::LoadFailed {
            target: unit("I").into(),
            error: Some(VendorError::new(509, "No ads to show")),
        })
        .await;
        let event = h.next_event().await;
        assert_eq!(event.phase, EventPhase::Show);
        assert!(event.is_error);
        assert_eq!(event.detail.as_deref(), Some("No ads to show"));
        assert_eq!(
            h.bridge.unit_state(AdType::Interstitial).await,
            Ok(Some(AdUnitState::LoadFailed))
        );

        h.bridge.load(AdType::Interstitial).unwrap();
        h.settle().await;
        assert_eq!(h.sdk.loads(AdType::Interstitial), 2);
        assert_eq!(
            h.bridge.unit_state(AdType::Interstitial).await,
            Ok(Some(AdUnitState::Loading))
        );
    }

    /// `isAvailable` tracks `Ready` through a full cycle.
    #[tokio::test]
    async fn test_is_available_iff_ready() {
        let h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;

        async fn check(h: &Harness) {
            for ad_type in AdType::ALL {
                let state = h.bridge.unit_state(ad_type).await.unwrap();
                assert_eq!(
                    h.bridge.is_available(ad_type),
                    state == Some(AdUnitState::Ready),
                    "{ad_type} in {state:?}"
                );
            }
        }

        check(&h).await;
        h.sdk.complete_load(AdType::Interstitial);
        h.settle().await;
        check(&h).await;
        h.bridge.show(AdType::Interstitial, ShowOptions::default()).unwrap();
        h.settle().await;
        check(&h).await;
        h.sdk.complete_show(AdType::Interstitial);
        h.settle().await;
        check(&h).await;
    }

    // =============================================================================
    // RE-INIT
    // =============================================================================

    /// Re-init releases the first listener; old-session callbacks are dropped.
    #[tokio::test]
    async fn test_reinit_replaces_listener() {
        let sdk = SimulatedSdk::new(SdkGeneration::AdUnitObjects);
        let bridge = bridge_for(&sdk);

        let first = RecordingListener::default();
        bridge.init(full_options(), first.clone()).unwrap();
        bridge.flush().await.unwrap();
        let old_callbacks = sdk.callbacks().expect("first sink");
        old_callbacks.deliver(VendorCallback::InitCompleted);
        bridge.flush().await.unwrap();
        assert_eq!(first.events.lock().len(), 1);

        let second = RecordingListener::default();
        bridge
            .init(InitOptions::with_app_key("K2").interstitial("I"), second.clone())
            .unwrap();
        bridge.flush().await.unwrap();
        assert_eq!(first.releases.load(Ordering::SeqCst), 1);

        // The first session's sink is still held by the vendor.
        old_callbacks.deliver(VendorCallback::Loaded(unit("I").into()));
        old_callbacks.deliver(VendorCallback::InitCompleted);
        bridge.flush().await.unwrap();
        assert!(second.events.lock().is_empty());
        assert_eq!(first.events.lock().len(), 1);

        sdk.fire(VendorCallback::InitCompleted);
        sdk.fire(VendorCallback::Loaded(unit("I").into()));
        bridge.flush().await.unwrap();
        let phases: Vec<EventPhase> = second.events.lock().iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![EventPhase::Success, EventPhase::Loaded]);
        assert_eq!(second.releases.load(Ordering::SeqCst), 0);
    }

    /// Re-init discards the previous session's units.
    #[tokio::test]
    async fn test_reinit_discards_previous_units() {
        let mut h = Harness::start(SdkGeneration::AdUnitObjects, full_options()).await;
        h.sdk.complete_load(AdType::RewardedVideo);
        h.settle().await;
        assert!(h.bridge.is_available(AdType::RewardedVideo));

        let (consumer, _events) = channel();
        h.bridge
            .init(InitOptions::with_app_key("K").interstitial("I"), consumer)
            .unwrap();
        h.settle().await;

        assert!(!h.bridge.is_available(AdType::RewardedVideo));
        assert_eq!(h.bridge.unit_state(AdType::RewardedVideo).await, Ok(None));
    }
}
