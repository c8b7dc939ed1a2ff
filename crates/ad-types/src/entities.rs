//! Core identifiers: ad types, ad-unit ids and bridge sessions.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of ad unit the bridge manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdType {
    /// Full-screen interstitial.
    #[serde(rename = "interstitial")]
    Interstitial,
    /// Rewarded video.
    #[serde(rename = "rewardedVideo")]
    RewardedVideo,
}

impl AdType {
    /// Every ad type, in a stable order.
    pub const ALL: [AdType; 2] = [AdType::Interstitial, AdType::RewardedVideo];

    /// The tag used by the scripting host.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interstitial => "interstitial",
            Self::RewardedVideo => "rewardedVideo",
        }
    }

    /// Message reported when a show is requested before the unit is ready.
    #[must_use]
    pub fn not_ready_message(&self) -> &'static str {
        match self {
            Self::Interstitial => "not ready",
            Self::RewardedVideo => "not available",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interstitial" => Ok(Self::Interstitial),
            "rewardedVideo" => Ok(Self::RewardedVideo),
            other => Err(ConfigError::UnknownAdType(other.to_string())),
        }
    }
}

/// Vendor-assigned identifier of an ad unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdUnitId(String);

impl AdUnitId {
    /// Wrap a non-empty identifier. Blank strings yield `None`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one accepted `init` call.
///
/// Sessions only ever grow. Vendor callback sinks are bound to the session
/// that created them so callbacks from a replaced session can be recognized
/// and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The session that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}
