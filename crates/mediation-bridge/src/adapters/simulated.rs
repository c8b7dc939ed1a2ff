//! # Simulated SDK
//!
//! An `AdSdkCapability` that behaves like any of the three SDK generations.
//! Every call is recorded; tests drive the vendor side by firing callbacks
//! through the sink captured at `initialize`, from any thread.
//!
//! With autopilot enabled the simulator answers on its own after a fixed
//! latency, from a background thread, the way a real SDK would:
//!
//! | Call | Callbacks fired |
//! |------|-----------------|
//! | `initialize` (async handshake) | `InitCompleted` |
//! | `initialize` (auto-loading type) | `AvailabilityChanged(true)` |
//! | `load_ad` | `Loaded` |
//! | `show_ad` | `ShowSucceeded`, `Rewarded` (rewarded video), `Closed` |

use ad_types::{AdTarget, AdType, AdUnitId, RewardPayload, VendorCallback};
use ad_unit::{
    AdSdkCapability, CapabilityError, CapabilityProfile, InitHandshake, InitRequest,
    SdkGeneration, VendorCallbackSink,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// A recorded capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    SetAdaptersDebug(bool),
    SetConsent(bool),
    SetMetadata { key: String, value: String },
    SetUserId(String),
    Initialize { app_key: String, ad_types: Vec<AdType> },
    Load {
        ad_type: AdType,
        ad_unit_id: Option<AdUnitId>,
    },
    Show {
        ad_type: AdType,
        ad_unit_id: Option<AdUnitId>,
        placement: Option<String>,
    },
    Pause,
    Resume,
}

#[derive(Default)]
struct SimState {
    calls: Vec<SdkCall>,
    callbacks: Option<Arc<dyn VendorCallbackSink>>,
    ready: HashSet<AdType>,
    unit_ids: HashMap<AdType, AdUnitId>,
    init_error: Option<CapabilityError>,
    load_error: Option<CapabilityError>,
    show_error: Option<CapabilityError>,
}

struct Inner {
    profile: CapabilityProfile,
    autopilot: Option<Duration>,
    state: Mutex<SimState>,
}

/// Scriptable vendor SDK. Clones share state.
#[derive(Clone)]
pub struct SimulatedSdk {
    inner: Arc<Inner>,
}

impl SimulatedSdk {
    #[must_use]
    pub fn new(generation: SdkGeneration) -> Self {
        Self {
            inner: Arc::new(Inner {
                profile: generation.profile(),
                autopilot: None,
                state: Mutex::new(SimState::default()),
            }),
        }
    }

    /// Answer calls automatically after `latency`.
    #[must_use]
    pub fn with_autopilot(generation: SdkGeneration, latency: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                profile: generation.profile(),
                autopilot: Some(latency),
                state: Mutex::new(SimState::default()),
            }),
        }
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SdkCall> {
        self.inner.state.lock().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SdkCall) -> bool) -> usize {
        self.inner.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    #[must_use]
    pub fn loads(&self, ad_type: AdType) -> usize {
        self.count(|c| matches!(c, SdkCall::Load { ad_type: t, .. } if *t == ad_type))
    }

    #[must_use]
    pub fn shows(&self, ad_type: AdType) -> usize {
        self.count(|c| matches!(c, SdkCall::Show { ad_type: t, .. } if *t == ad_type))
    }

    /// Set what `is_ready` answers for `ad_type`.
    pub fn set_ready(&self, ad_type: AdType, ready: bool) {
        self.inner.set_ready(ad_type, ready);
    }

    /// Make the next `initialize` calls fail synchronously.
    pub fn fail_initialize(&self, error: Option<CapabilityError>) {
        self.inner.state.lock().init_error = error;
    }

    /// Make `load_ad` fail synchronously.
    pub fn fail_loads(&self, error: Option<CapabilityError>) {
        self.inner.state.lock().load_error = error;
    }

    /// Make `show_ad` fail synchronously.
    pub fn fail_shows(&self, error: Option<CapabilityError>) {
        self.inner.state.lock().show_error = error;
    }

    /// The sink captured by the most recent `initialize`.
    #[must_use]
    pub fn callbacks(&self) -> Option<Arc<dyn VendorCallbackSink>> {
        self.inner.state.lock().callbacks.clone()
    }

    /// Fire `callback` through the current sink.
    ///
    /// # Returns
    ///
    /// `false` when `initialize` was never called.
    pub fn fire(&self, callback: VendorCallback) -> bool {
        match self.callbacks() {
            Some(sink) => {
                sink.deliver(callback);
                true
            }
            None => {
                warn!(callback = callback.kind(), "No callback sink, simulated callback lost");
                false
            }
        }
    }

    /// How this generation identifies `ad_type` in callbacks.
    #[must_use]
    pub fn target_for(&self, ad_type: AdType) -> AdTarget {
        self.inner.target_for(ad_type)
    }

    /// Finish a load: mark `ad_type` ready and report it the way this
    /// generation does.
    pub fn complete_load(&self, ad_type: AdType) -> bool {
        self.set_ready(ad_type, true);
        self.fire(self.inner.load_callback(ad_type))
    }

    /// Play a full show: displayed, rewarded (rewarded video only), closed.
    pub fn complete_show(&self, ad_type: AdType) -> bool {
        let Some(sink) = self.callbacks() else {
            return false;
        };
        self.set_ready(ad_type, false);
        for callback in self.inner.show_callbacks(ad_type) {
            sink.deliver(callback);
        }
        true
    }

    fn record(&self, call: SdkCall) {
        self.inner.state.lock().calls.push(call);
    }

    /// Run `script` on a vendor thread after the autopilot latency.
    fn schedule<F>(&self, script: F)
    where
        F: FnOnce(&Inner, &dyn VendorCallbackSink) + Send + 'static,
    {
        let Some(latency) = self.inner.autopilot else {
            return;
        };
        let Some(sink) = self.callbacks() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            thread::sleep(latency);
            script(&inner, sink.as_ref());
        });
    }
}

impl Inner {
    fn target_for(&self, ad_type: AdType) -> AdTarget {
        if self.profile.requires_ad_unit_ids {
            if let Some(id) = self.state.lock().unit_ids.get(&ad_type) {
                return AdTarget::Unit(id.clone());
            }
        }
        AdTarget::Type(ad_type)
    }

    fn load_callback(&self, ad_type: AdType) -> VendorCallback {
        let target = self.target_for(ad_type);
        if self.profile.vendor_loads(ad_type) {
            VendorCallback::AvailabilityChanged {
                target,
                available: true,
            }
        } else {
            VendorCallback::Loaded(target)
        }
    }

    fn show_callbacks(&self, ad_type: AdType) -> Vec<VendorCallback> {
        let target = self.target_for(ad_type);
        let mut callbacks = vec![
            VendorCallback::Opened(target.clone()),
            VendorCallback::ShowSucceeded(target.clone()),
        ];
        if ad_type == AdType::RewardedVideo {
            let reward = match self.profile.generation {
                SdkGeneration::AdUnitObjects => RewardPayload::Reward {
                    name: "coins".into(),
                    amount: 10,
                },
                _ => RewardPayload::Placement {
                    placement_name: "DefaultRewardedVideo".into(),
                    reward_name: Some("coins".into()),
                    reward_amount: Some(10),
                },
            };
            callbacks.push(VendorCallback::Rewarded {
                target: target.clone(),
                reward,
            });
        }
        callbacks.push(VendorCallback::Closed(target));
        callbacks
    }

    fn set_ready(&self, ad_type: AdType, ready: bool) {
        let mut state = self.state.lock();
        if ready {
            state.ready.insert(ad_type);
        } else {
            state.ready.remove(&ad_type);
        }
    }
}

impl AdSdkCapability for SimulatedSdk {
    fn profile(&self) -> CapabilityProfile {
        self.inner.profile
    }

    fn set_adapters_debug(&self, enabled: bool) {
        self.record(SdkCall::SetAdaptersDebug(enabled));
    }

    fn set_consent(&self, has_user_consent: bool) {
        self.record(SdkCall::SetConsent(has_user_consent));
    }

    fn set_metadata(&self, key: &str, value: &str) {
        self.record(SdkCall::SetMetadata {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn set_user_id(&self, user_id: &str) {
        self.record(SdkCall::SetUserId(user_id.to_string()));
    }

    fn initialize(
        &self,
        request: &InitRequest,
        callbacks: Arc<dyn VendorCallbackSink>,
    ) -> Result<(), CapabilityError> {
        {
            let mut state = self.inner.state.lock();
            state.calls.push(SdkCall::Initialize {
                app_key: request.app_key.clone(),
                ad_types: request.ad_types.clone(),
            });
            if let Some(err) = state.init_error.clone() {
                return Err(err);
            }
            state.callbacks = Some(callbacks);
        }
        debug!(generation = %self.inner.profile.generation, "Simulated SDK initialized");

        let ad_types = request.ad_types.clone();
        self.schedule(move |inner, sink| {
            if inner.profile.init_handshake == InitHandshake::Asynchronous {
                sink.deliver(VendorCallback::InitCompleted);
            }
            for ad_type in ad_types {
                if inner.profile.vendor_loads(ad_type) {
                    inner.set_ready(ad_type, true);
                    sink.deliver(inner.load_callback(ad_type));
                }
            }
        });
        Ok(())
    }

    fn load_ad(&self, ad_type: AdType, ad_unit_id: Option<&AdUnitId>) -> Result<(), CapabilityError> {
        {
            let mut state = self.inner.state.lock();
            state.calls.push(SdkCall::Load {
                ad_type,
                ad_unit_id: ad_unit_id.cloned(),
            });
            if let Some(id) = ad_unit_id {
                state.unit_ids.insert(ad_type, id.clone());
            }
            if let Some(err) = state.load_error.clone() {
                return Err(err);
            }
        }

        self.schedule(move |inner, sink| {
            inner.set_ready(ad_type, true);
            sink.deliver(inner.load_callback(ad_type));
        });
        Ok(())
    }

    fn show_ad(
        &self,
        ad_type: AdType,
        ad_unit_id: Option<&AdUnitId>,
        placement: Option<&str>,
    ) -> Result<(), CapabilityError> {
        {
            let mut state = self.inner.state.lock();
            state.calls.push(SdkCall::Show {
                ad_type,
                ad_unit_id: ad_unit_id.cloned(),
                placement: placement.map(str::to_string),
            });
            if let Some(err) = state.show_error.clone() {
                return Err(err);
            }
            state.ready.remove(&ad_type);
        }

        self.schedule(move |inner, sink| {
            for callback in inner.show_callbacks(ad_type) {
                sink.deliver(callback);
            }
            // Auto-loading generations refill on their own.
            if inner.profile.vendor_loads(ad_type) {
                inner.set_ready(ad_type, true);
                sink.deliver(inner.load_callback(ad_type));
            }
        });
        Ok(())
    }

    fn is_ready(&self, ad_type: AdType, _ad_unit_id: Option<&AdUnitId>) -> bool {
        self.inner.state.lock().ready.contains(&ad_type)
    }

    fn on_pause(&self) {
        self.record(SdkCall::Pause);
    }

    fn on_resume(&self) {
        self.record(SdkCall::Resume);
    }
}

impl std::fmt::Debug for SimulatedSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSdk")
            .field("generation", &self.inner.profile.generation)
            .field("autopilot", &self.inner.autopilot)
            .finish_non_exhaustive()
    }
}
