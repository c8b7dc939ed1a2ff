//! # SDK Generations
//!
//! The same host script against each vendor generation.
//!
//! | Generation | Init | Units built | Rewarded load | Pause/resume |
//! |------------|------|-------------|---------------|--------------|
//! | static listener | sync | both types | vendor | forwarded |
//! | per-unit listener | async | both types | vendor | forwarded |
//! | ad-unit objects | async | configured ids | explicit | not forwarded |

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ad_event_sink::channel;
    use ad_types::{AdType, EventPhase, InitOptions, NormalizedEvent, ShowOptions, VendorCallback};
    use ad_unit::{AdUnitState, LoadFailurePhase, SdkGeneration};
    use mediation_bridge::{BridgeConfig, MediationBridge, SdkCall, SimulatedSdk};

    use crate::integration::harness::{bridge_for, full_options, Harness};

    const ALL_GENERATIONS: [SdkGeneration; 3] = [
        SdkGeneration::StaticListener,
        SdkGeneration::PerUnitListener,
        SdkGeneration::AdUnitObjects,
    ];

    /// One full interstitial cycle works identically on every generation.
    #[tokio::test]
    async fn test_interstitial_cycle_on_every_generation() {
        for generation in ALL_GENERATIONS {
            let mut h = Harness::start(generation, full_options()).await;
            assert_eq!(h.take_events(), vec![NormalizedEvent::init_success()], "{generation}");

            h.sdk.complete_load(AdType::Interstitial);
            h.settle().await;
            assert!(h.bridge.is_available(AdType::Interstitial), "{generation}");

            h.bridge
                .show(AdType::Interstitial, ShowOptions::default())
                .unwrap();
            h.settle().await;
            h.sdk.complete_show(AdType::Interstitial);
            h.settle().await;

            let phases: Vec<EventPhase> = h.take_events().iter().map(|e| e.phase).collect();
            assert_eq!(
                phases,
                vec![EventPhase::Loaded, EventPhase::Show, EventPhase::Closed],
                "{generation}"
            );
            assert_eq!(h.sdk.loads(AdType::Interstitial), 2, "{generation}");
            h.bridge.shutdown().await;
        }
    }

    /// Auto-loading generations never receive a load for rewarded video.
    #[tokio::test]
    async fn test_auto_loaded_rewarded_never_explicitly_loaded() {
        for generation in [SdkGeneration::StaticListener, SdkGeneration::PerUnitListener] {
            let mut h = Harness::start(generation, full_options()).await;

            h.bridge.load(AdType::RewardedVideo).unwrap();
            h.sdk.complete_load(AdType::RewardedVideo);
            h.settle().await;
            assert!(h.bridge.is_available(AdType::RewardedVideo), "{generation}");

            h.bridge
                .show(AdType::RewardedVideo, ShowOptions::placement("Shop"))
                .unwrap();
            h.settle().await;
            h.sdk.complete_show(AdType::RewardedVideo);
            h.settle().await;

            assert_eq!(h.sdk.loads(AdType::RewardedVideo), 0, "{generation}");
            assert_eq!(
                h.bridge.unit_state(AdType::RewardedVideo).await,
                Ok(Some(AdUnitState::Loading)),
                "{generation}"
            );

            let reward = h
                .take_events()
                .into_iter()
                .find(|e| e.phase == EventPhase::Reward)
                .expect("reward event");
            assert_eq!(reward.detail.as_deref(), Some("DefaultRewardedVideo"));
        }
    }

    /// Vendor-side availability loss takes the unit out of `Ready`.
    #[tokio::test]
    async fn test_availability_false_clears_ready() {
        let mut h = Harness::start(SdkGeneration::StaticListener, full_options()).await;
        h.sdk.complete_load(AdType::RewardedVideo);
        h.settle().await;
        assert!(h.bridge.is_available(AdType::RewardedVideo));
        h.take_events();

        h.sdk.set_ready(AdType::RewardedVideo, false);
        h.vendor(VendorCallback::AvailabilityChanged {
            target: AdType::RewardedVideo.into(),
            available: false,
        })
        .await;

        assert!(!h.bridge.is_available(AdType::RewardedVideo));
        assert!(h.take_events().is_empty());
    }

    /// The static generation's init is synchronous: no completion callback.
    #[tokio::test]
    async fn test_static_listener_initializes_synchronously() {
        let sdk = SimulatedSdk::new(SdkGeneration::StaticListener);
        let bridge = bridge_for(&sdk);
        let (consumer, mut events) = channel();
        bridge.init(InitOptions::with_app_key("K"), consumer).unwrap();
        bridge.flush().await.unwrap();

        assert_eq!(events.drain(), vec![NormalizedEvent::init_success()]);
        assert_eq!(
            sdk.calls().iter().find(|c| matches!(c, SdkCall::Initialize { .. })),
            Some(&SdkCall::Initialize {
                app_key: "K".into(),
                ad_types: AdType::ALL.to_vec()
            })
        );
        assert_eq!(
            bridge.unit_state(AdType::Interstitial).await,
            Ok(Some(AdUnitState::Loading))
        );
    }

    /// Generation 3 builds units only for configured ids.
    #[tokio::test]
    async fn test_ad_unit_objects_skip_unconfigured_types() {
        let mut h = Harness::start(
            SdkGeneration::AdUnitObjects,
            InitOptions::with_app_key("K").rewarded("R"),
        )
        .await;

        assert_eq!(h.bridge.unit_state(AdType::Interstitial).await, Ok(None));
        assert_eq!(
            h.bridge.unit_state(AdType::RewardedVideo).await,
            Ok(Some(AdUnitState::Loading))
        );
        assert_eq!(
            h.sdk.calls().last(),
            Some(&SdkCall::Load {
                ad_type: AdType::RewardedVideo,
                ad_unit_id: ad_types::AdUnitId::new("R")
            })
        );

        h.bridge.load(AdType::Interstitial).unwrap();
        h.bridge
            .show(AdType::Interstitial, ShowOptions::default())
            .unwrap();
        h.settle().await;
        assert_eq!(h.sdk.loads(AdType::Interstitial), 0);
        assert_eq!(h.take_events(), vec![NormalizedEvent::init_success()]);
    }

    /// Pause/resume reach the SDK only where the generation needs them.
    #[tokio::test]
    async fn test_lifecycle_forwarding_per_generation() {
        for generation in ALL_GENERATIONS {
            let h = Harness::start(generation, full_options()).await;
            h.bridge.on_pause().unwrap();
            h.bridge.on_resume().unwrap();
            h.settle().await;

            let forwarded = h
                .sdk
                .count(|c| matches!(c, SdkCall::Pause | SdkCall::Resume));
            let expected = if generation.profile().forwards_lifecycle { 2 } else { 0 };
            assert_eq!(forwarded, expected, "{generation}");
        }
    }

    /// The config override wins over the generation profile.
    #[tokio::test]
    async fn test_lifecycle_override() {
        let sdk = SimulatedSdk::new(SdkGeneration::AdUnitObjects);
        let config = BridgeConfig {
            forward_lifecycle: Some(true),
            ..BridgeConfig::default()
        };
        let bridge = MediationBridge::spawn(Arc::new(sdk.clone()), config);
        bridge.on_pause().unwrap();
        bridge.flush().await.unwrap();
        assert_eq!(sdk.calls(), vec![SdkCall::Pause]);
    }

    /// Load failures use the dedicated phase when configured.
    #[tokio::test]
    async fn test_load_failure_phase_mapping() {
        for (phase, expected) in [
            (LoadFailurePhase::Legacy, EventPhase::Show),
            (LoadFailurePhase::Dedicated, EventPhase::LoadFailed),
        ] {
            let config = BridgeConfig {
                load_failure_phase: phase,
                ..BridgeConfig::default()
            };
            let mut h = Harness::start_with(
                SimulatedSdk::new(SdkGeneration::PerUnitListener),
                config,
                full_options(),
            )
            .await;
            h.take_events();

            h.vendor(VendorCallback::LoadFailed {
                target: AdType::Interstitial.into(),
                error: None,
            })
            .await;
            let event = h.next_event().await;
            assert_eq!(event.phase, expected);
            assert!(event.is_error);
            assert_eq!(event.detail.as_deref(), Some("load failed"));
        }
    }
}
