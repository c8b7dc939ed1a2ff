//! # Normalized Events
//!
//! The canonical, version-independent notification shape delivered to the
//! host listener. Every vendor callback maps to at most one of these.
//!
//! ```text
//! { name = "adMediation", type = "interstitial", phase = "loaded", isError = false }
//! { name = "adMediation", type = "init", phase = "failed", isError = true, response = "..." }
//! ```

use crate::entities::AdType;
use crate::errors::ConfigError;
use crate::{EVENT_NAME, INIT_EVENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `type` field of an event: an ad type or initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventType {
    /// SDK initialization outcome.
    Init,
    /// Lifecycle of one ad unit.
    Ad(AdType),
}

impl EventType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => INIT_EVENT_TYPE,
            Self::Ad(ad_type) => ad_type.as_str(),
        }
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for EventType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == INIT_EVENT_TYPE {
            Ok(Self::Init)
        } else {
            value.parse().map(Self::Ad)
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed phase vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventPhase {
    /// Initialization succeeded.
    Success,
    /// Initialization failed.
    Failed,
    /// An ad finished loading.
    Loaded,
    /// The vendor reported the ad as available (auto-loading generations).
    Available,
    /// Show outcome. Also carries load failures under the legacy mapping.
    Show,
    /// Dedicated load-failure phase, only emitted when enabled.
    LoadFailed,
    /// The ad was dismissed.
    Closed,
    /// A reward was granted.
    Reward,
}

impl EventPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Loaded => "loaded",
            Self::Available => "available",
            Self::Show => "show",
            Self::LoadFailed => "loadFailed",
            Self::Closed => "closed",
            Self::Reward => "reward",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sole payload shape crossing the bridge boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub phase: EventPhase,
    #[serde(rename = "isError")]
    pub is_error: bool,
    /// Vendor error text, or the reward/placement name for reward events.
    #[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl NormalizedEvent {
    /// An ad-unit event.
    #[must_use]
    pub fn ad(ad_type: AdType, phase: EventPhase, is_error: bool, detail: Option<String>) -> Self {
        Self {
            event_type: EventType::Ad(ad_type),
            phase,
            is_error,
            detail,
        }
    }

    #[must_use]
    pub fn init_success() -> Self {
        Self {
            event_type: EventType::Init,
            phase: EventPhase::Success,
            is_error: false,
            detail: None,
        }
    }

    #[must_use]
    pub fn init_failed(detail: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Init,
            phase: EventPhase::Failed,
            is_error: true,
            detail: Some(detail.into()),
        }
    }

    /// Reported when a show is requested while the unit is not `Ready`.
    #[must_use]
    pub fn not_ready(ad_type: AdType) -> Self {
        Self::ad(
            ad_type,
            EventPhase::Show,
            true,
            Some(ad_type.not_ready_message().to_string()),
        )
    }

    /// The ad type this event concerns, `None` for init events.
    #[must_use]
    pub fn ad_type(&self) -> Option<AdType> {
        match self.event_type {
            EventType::Ad(ad_type) => Some(ad_type),
            EventType::Init => None,
        }
    }

    /// Render the table handed to the scripting host listener.
    #[must_use]
    pub fn to_host_table(&self) -> serde_json::Value {
        let mut table = serde_json::json!({
            "name": EVENT_NAME,
            "type": self.event_type.as_str(),
            "phase": self.phase.as_str(),
            "isError": self.is_error,
        });
        if let (Some(detail), Some(map)) = (&self.detail, table.as_object_mut()) {
            map.insert("response".into(), serde_json::Value::String(detail.clone()));
        }
        table
    }
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_type, self.phase)?;
        if self.is_error {
            f.write_str(" (error)")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}
