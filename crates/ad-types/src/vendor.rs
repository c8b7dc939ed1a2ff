//! # Vendor Callback Shapes
//!
//! The union of lifecycle callbacks observed across SDK generations. Older
//! generations identify an ad by its type (one global listener per type);
//! newer ones hand back the ad-unit object, which the capability reduces to
//! its id.

use crate::entities::{AdType, AdUnitId};
use std::fmt;

/// Which ad unit a callback concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdTarget {
    /// Static-listener generations: the callback is bound to an ad type.
    Type(AdType),
    /// Per-unit generations: the callback carries the ad-unit id.
    Unit(AdUnitId),
}

impl From<AdType> for AdTarget {
    fn from(ad_type: AdType) -> Self {
        Self::Type(ad_type)
    }
}

impl From<AdUnitId> for AdTarget {
    fn from(id: AdUnitId) -> Self {
        Self::Unit(id)
    }
}

impl fmt::Display for AdTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ad_type) => write!(f, "{ad_type}"),
            Self::Unit(id) => write!(f, "unit:{id}"),
        }
    }
}

/// Error reported by the vendor SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    pub code: i32,
    pub message: Option<String>,
}

impl VendorError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// The vendor message, or `fallback` when the vendor sent none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (code {})",
            self.message.as_deref().unwrap_or("unknown error"),
            self.code
        )
    }
}

/// Reward payload, shaped differently per generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardPayload {
    /// Older generations report the placement the reward was granted for.
    Placement {
        placement_name: String,
        reward_name: Option<String>,
        reward_amount: Option<u32>,
    },
    /// Newer generations report the reward itself.
    Reward { name: String, amount: u32 },
    /// The vendor sent nothing usable.
    Empty,
}

impl RewardPayload {
    /// The name surfaced to the host as the event `response`.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Placement { placement_name, .. } => Some(placement_name.clone()),
            Self::Reward { name, .. } => Some(name.clone()),
            Self::Empty => None,
        }
    }
}

/// A lifecycle callback raised by the vendor SDK, on a thread it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorCallback {
    /// Asynchronous initialization finished successfully.
    InitCompleted,
    /// Asynchronous initialization failed.
    InitFailed(VendorError),
    /// An ad finished loading.
    Loaded(AdTarget),
    /// Loading failed.
    LoadFailed {
        target: AdTarget,
        error: Option<VendorError>,
    },
    /// Vendor-managed availability changed (auto-loading generations).
    AvailabilityChanged { target: AdTarget, available: bool },
    /// The ad surface opened.
    Opened(AdTarget),
    /// The ad was displayed.
    ShowSucceeded(AdTarget),
    /// The ad could not be displayed.
    ShowFailed {
        target: AdTarget,
        error: Option<VendorError>,
    },
    Clicked(AdTarget),
    /// The ad was dismissed. Always follows a show attempt.
    Closed(AdTarget),
    /// The user earned the reward.
    Rewarded {
        target: AdTarget,
        reward: RewardPayload,
    },
    VideoStarted(AdTarget),
    VideoEnded(AdTarget),
}

impl VendorCallback {
    /// The ad unit this callback concerns; `None` for init callbacks.
    #[must_use]
    pub fn target(&self) -> Option<&AdTarget> {
        match self {
            Self::InitCompleted | Self::InitFailed(_) => None,
            Self::Loaded(target)
            | Self::Opened(target)
            | Self::ShowSucceeded(target)
            | Self::Clicked(target)
            | Self::Closed(target)
            | Self::VideoStarted(target)
            | Self::VideoEnded(target)
            | Self::LoadFailed { target, .. }
            | Self::AvailabilityChanged { target, .. }
            | Self::ShowFailed { target, .. }
            | Self::Rewarded { target, .. } => Some(target),
        }
    }

    /// Short name used in logs and metrics labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitCompleted => "init_completed",
            Self::InitFailed(_) => "init_failed",
            Self::Loaded(_) => "loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::AvailabilityChanged { .. } => "availability_changed",
            Self::Opened(_) => "opened",
            Self::ShowSucceeded(_) => "show_succeeded",
            Self::ShowFailed { .. } => "show_failed",
            Self::Clicked(_) => "clicked",
            Self::Closed(_) => "closed",
            Self::Rewarded { .. } => "rewarded",
            Self::VideoStarted(_) => "video_started",
            Self::VideoEnded(_) => "video_ended",
        }
    }
}
