//! # Event Normalizer
//!
//! Maps vendor callbacks to the canonical event shape. Pure: no state, no
//! side effects, no panics.
//!
//! | Vendor callback | Event |
//! |-----------------|-------|
//! | `InitCompleted` | `init/success` |
//! | `InitFailed` | `init/failed`, error, `"<message> (code <n>)"` |
//! | `Loaded` | `<type>/loaded` |
//! | `AvailabilityChanged(true)` | `<type>/available` |
//! | `LoadFailed` | `<type>/show` error (or `loadFailed`) |
//! | `ShowSucceeded` | `<type>/show` |
//! | `ShowFailed` | `<type>/show` error |
//! | `Closed` | `<type>/closed` |
//! | `Rewarded` | `rewardedVideo/reward`, reward or placement name |
//! | anything else | nothing |

use ad_types::{AdType, EventPhase, NormalizedEvent, VendorCallback, VendorError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const LOAD_FAILED_FALLBACK: &str = "load failed";
const SHOW_FAILED_FALLBACK: &str = "show failed";

/// Which phase load failures are reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePhase {
    /// `show` with `isError = true`, as existing host scripts expect.
    #[default]
    Legacy,
    /// A dedicated `loadFailed` phase.
    Dedicated,
}

impl FromStr for LoadFailurePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "show" => Ok(Self::Legacy),
            "dedicated" | "loadfailed" => Ok(Self::Dedicated),
            other => Err(format!("unknown load failure phase: {other}")),
        }
    }
}

/// Stateless vendor-callback to event mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventNormalizer {
    load_failure_phase: LoadFailurePhase,
}

impl EventNormalizer {
    #[must_use]
    pub fn new(load_failure_phase: LoadFailurePhase) -> Self {
        Self { load_failure_phase }
    }

    /// Map an ad-unit callback already resolved to `ad_type`.
    #[must_use]
    pub fn normalize(&self, ad_type: AdType, callback: &VendorCallback) -> Option<NormalizedEvent> {
        match callback {
            VendorCallback::Loaded(_) => Some(NormalizedEvent::ad(
                ad_type,
                EventPhase::Loaded,
                false,
                None,
            )),
            VendorCallback::AvailabilityChanged { available: true, .. } => Some(
                NormalizedEvent::ad(ad_type, EventPhase::Available, false, None),
            ),
            VendorCallback::LoadFailed { error, .. } => Some(self.load_failed(ad_type, error.as_ref())),
            VendorCallback::ShowSucceeded(_) => {
                Some(NormalizedEvent::ad(ad_type, EventPhase::Show, false, None))
            }
            VendorCallback::ShowFailed { error, .. } => Some(NormalizedEvent::ad(
                ad_type,
                EventPhase::Show,
                true,
                Some(message_or(error.as_ref(), SHOW_FAILED_FALLBACK)),
            )),
            VendorCallback::Closed(_) => {
                Some(NormalizedEvent::ad(ad_type, EventPhase::Closed, false, None))
            }
            VendorCallback::Rewarded { reward, .. } if ad_type == AdType::RewardedVideo => Some(
                NormalizedEvent::ad(ad_type, EventPhase::Reward, false, reward.display_name()),
            ),
            _ => None,
        }
    }

    /// Map an initialization callback.
    #[must_use]
    pub fn normalize_init(&self, callback: &VendorCallback) -> Option<NormalizedEvent> {
        match callback {
            VendorCallback::InitCompleted => Some(NormalizedEvent::init_success()),
            VendorCallback::InitFailed(error) => Some(Self::init_failed(error)),
            _ => None,
        }
    }

    /// Init failure event carrying the vendor message and code.
    fn init_failed(error: &VendorError) -> NormalizedEvent {
        NormalizedEvent::init_failed(error.to_string())
    }

    /// Load failure event under the configured phase.
    #[must_use]
    pub fn load_failed(&self, ad_type: AdType, error: Option<&VendorError>) -> NormalizedEvent {
        let phase = match self.load_failure_phase {
            LoadFailurePhase::Legacy => EventPhase::Show,
            LoadFailurePhase::Dedicated => EventPhase::LoadFailed,
        };
        NormalizedEvent::ad(
            ad_type,
            phase,
            true,
            Some(message_or(error, LOAD_FAILED_FALLBACK)),
        )
    }

    /// Show failure event for a synchronous capability error.
    #[must_use]
    pub fn show_failed(&self, ad_type: AdType, error: Option<&VendorError>) -> NormalizedEvent {
        NormalizedEvent::ad(
            ad_type,
            EventPhase::Show,
            true,
            Some(message_or(error, SHOW_FAILED_FALLBACK)),
        )
    }
}

fn message_or(error: Option<&VendorError>, fallback: &str) -> String {
    error.map_or_else(|| fallback.to_string(), |e| e.message_or(fallback))
}
