//! # Inbound Port - AdUnitApi
//!
//! The driving port through which the bridge operates one ad unit.
//!
//! Every method runs inside the bridge's serialized context; none of them
//! block on the vendor. Each returns the event (if any) the caller must hand
//! to the event sink.

use crate::domain::AdUnitState;
use ad_types::{NormalizedEvent, VendorCallback};

/// Primary API of an ad unit.
pub trait AdUnitApi: Send {
    /// Start a load unless one is in flight or an ad is already on hand.
    ///
    /// Returns an error event only when the SDK rejects the load outright.
    fn request_load(&mut self) -> Option<NormalizedEvent>;

    /// Show the loaded ad.
    ///
    /// Outside `Ready` this returns the "not ready" / "not available" event
    /// and does not touch the SDK.
    fn request_show(&mut self, placement: Option<&str>) -> Option<NormalizedEvent>;

    /// Apply a vendor callback already routed to this unit.
    fn handle_callback(&mut self, callback: &VendorCallback) -> Option<NormalizedEvent>;

    /// True iff the unit is `Ready`.
    fn is_available(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> AdUnitState;
}
