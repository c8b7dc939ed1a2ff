//! Ad-unit lifecycle states.

use std::fmt;

/// Lifecycle state of one ad unit.
///
/// `LoadFailed` and `ShowFailed` are terminal per attempt; the next explicit
/// or automatic load moves the unit back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdUnitState {
    /// No load requested yet.
    #[default]
    Uninitialized,
    /// A load is in flight.
    Loading,
    /// An ad is loaded and can be shown.
    Ready,
    /// A show was issued and the ad has not closed yet.
    Showing,
    /// The ad was dismissed.
    Closed,
    /// The last load attempt failed.
    LoadFailed,
    /// The last show attempt failed.
    ShowFailed,
}

impl AdUnitState {
    /// Whether `request_load` starts a new load from this state.
    ///
    /// `Loading` and `Ready` already have (or are getting) an ad, and a load
    /// cannot start while an ad is on screen.
    #[must_use]
    pub fn accepts_load(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized | Self::LoadFailed | Self::ShowFailed | Self::Closed
        )
    }

    /// Whether a vendor close belongs to this state. Closes only follow a
    /// show; anything else is a late or duplicate callback.
    #[must_use]
    pub fn accepts_close(&self) -> bool {
        matches!(self, Self::Showing | Self::ShowFailed)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Showing => "showing",
            Self::Closed => "closed",
            Self::LoadFailed => "load_failed",
            Self::ShowFailed => "show_failed",
        }
    }
}

impl fmt::Display for AdUnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
