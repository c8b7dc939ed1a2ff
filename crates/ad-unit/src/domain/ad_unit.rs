//! # Ad Unit
//!
//! Lifecycle state machine for one ad type. Vendor callbacks are transition
//! triggers; the unit decides what they mean given its current state and
//! returns the normalized event to publish.

use super::errors::AdUnitError;
use super::normalizer::EventNormalizer;
use super::state::AdUnitState;
use crate::ports::{AdSdkCapability, AdUnitApi};
use ad_types::{AdTarget, AdType, AdUnitId, NormalizedEvent, VendorCallback, VendorError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One ad unit and its lifecycle.
pub struct AdUnit {
    ad_type: AdType,
    ad_unit_id: Option<AdUnitId>,
    state: AdUnitState,
    last_error: Option<String>,
    capability: Arc<dyn AdSdkCapability>,
    /// The vendor loads this ad type itself; explicit loads only wait.
    vendor_loads: bool,
    normalizer: EventNormalizer,
}

impl AdUnit {
    pub fn new(
        ad_type: AdType,
        ad_unit_id: Option<AdUnitId>,
        capability: Arc<dyn AdSdkCapability>,
        normalizer: EventNormalizer,
    ) -> Self {
        let vendor_loads = capability.profile().vendor_loads(ad_type);
        Self {
            ad_type,
            ad_unit_id,
            state: AdUnitState::Uninitialized,
            last_error: None,
            capability,
            vendor_loads,
            normalizer,
        }
    }

    #[must_use]
    pub fn ad_type(&self) -> AdType {
        self.ad_type
    }

    #[must_use]
    pub fn ad_unit_id(&self) -> Option<&AdUnitId> {
        self.ad_unit_id.as_ref()
    }

    /// Message of the most recent vendor failure, cleared on a successful load.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a callback target designates this unit.
    #[must_use]
    pub fn matches(&self, target: &AdTarget) -> bool {
        match target {
            AdTarget::Type(ad_type) => *ad_type == self.ad_type,
            AdTarget::Unit(id) => self.ad_unit_id.as_ref() == Some(id),
        }
    }

    fn transition(&mut self, next: AdUnitState) {
        if self.state != next {
            debug!(
                ad_type = %self.ad_type,
                from = %self.state,
                to = %next,
                "Ad unit transition"
            );
            self.state = next;
        }
    }

    /// Enter `Loading` and ask the SDK for an ad.
    fn start_load(&mut self) -> Result<(), AdUnitError> {
        self.transition(AdUnitState::Loading);

        if self.vendor_loads {
            if self
                .capability
                .is_ready(self.ad_type, self.ad_unit_id.as_ref())
            {
                self.transition(AdUnitState::Ready);
            } else {
                debug!(ad_type = %self.ad_type, "Ad type is loaded by the SDK, waiting for availability");
            }
            return Ok(());
        }

        self.capability
            .load_ad(self.ad_type, self.ad_unit_id.as_ref())
            .map_err(AdUnitError::from)
    }

    fn fail_load(&mut self, err: AdUnitError) -> NormalizedEvent {
        warn!(ad_type = %self.ad_type, error = %err, "Load rejected by SDK");
        self.transition(AdUnitState::LoadFailed);
        let vendor = match err {
            AdUnitError::Capability(cap) => VendorError::from(cap),
            other => VendorError {
                code: 0,
                message: Some(other.to_string()),
            },
        };
        self.last_error = vendor.message.clone();
        self.normalizer.load_failed(self.ad_type, Some(&vendor))
    }

    fn record_error(&mut self, error: Option<&VendorError>, fallback: &str) {
        self.last_error = Some(error.map_or_else(|| fallback.to_string(), |e| e.message_or(fallback)));
    }

    /// Closed ads reload right away so the next request finds one.
    fn reload_after_close(&mut self) {
        if let Err(err) = self.start_load() {
            // The close event already went out; the failure shows up as
            // "not ready" on the next show.
            warn!(ad_type = %self.ad_type, error = %err, "Reload after close rejected by SDK");
            self.transition(AdUnitState::LoadFailed);
            self.last_error = Some(err.to_string());
        }
    }
}

impl AdUnitApi for AdUnit {
    fn request_load(&mut self) -> Option<NormalizedEvent> {
        if !self.state.accepts_load() {
            debug!(ad_type = %self.ad_type, state = %self.state, "Load ignored");
            return None;
        }
        match self.start_load() {
            Ok(()) => None,
            Err(err) => Some(self.fail_load(err)),
        }
    }

    fn request_show(&mut self, placement: Option<&str>) -> Option<NormalizedEvent> {
        if !self.state.is_ready() {
            let err = AdUnitError::NotReady {
                ad_type: self.ad_type,
                state: self.state,
            };
            info!(error = %err, "Show refused");
            return Some(NormalizedEvent::not_ready(self.ad_type));
        }

        if !self
            .capability
            .is_ready(self.ad_type, self.ad_unit_id.as_ref())
        {
            let err = AdUnitError::VendorNotReady {
                ad_type: self.ad_type,
            };
            warn!(error = %err, "Show refused, reloading");
            self.transition(AdUnitState::LoadFailed);
            self.last_error = Some(err.to_string());
            self.reload_after_close();
            return Some(NormalizedEvent::not_ready(self.ad_type));
        }

        self.transition(AdUnitState::Showing);
        match self
            .capability
            .show_ad(self.ad_type, self.ad_unit_id.as_ref(), placement)
        {
            Ok(()) => None,
            Err(err) => {
                warn!(ad_type = %self.ad_type, error = %err, "Show rejected by SDK");
                let vendor = VendorError::from(err);
                self.transition(AdUnitState::ShowFailed);
                self.last_error = vendor.message.clone();
                Some(self.normalizer.show_failed(self.ad_type, Some(&vendor)))
            }
        }
    }

    fn handle_callback(&mut self, callback: &VendorCallback) -> Option<NormalizedEvent> {
        match callback {
            VendorCallback::Loaded(_)
            | VendorCallback::AvailabilityChanged {
                available: true, ..
            } => {
                if self.state == AdUnitState::Showing {
                    debug!(ad_type = %self.ad_type, "Ad loaded while showing, keeping state");
                } else {
                    self.transition(AdUnitState::Ready);
                    self.last_error = None;
                }
            }
            VendorCallback::AvailabilityChanged {
                available: false, ..
            } => {
                if self.state.is_ready() {
                    self.transition(AdUnitState::Loading);
                }
            }
            VendorCallback::LoadFailed { error, .. } => {
                if self.state == AdUnitState::Loading {
                    self.transition(AdUnitState::LoadFailed);
                } else {
                    warn!(ad_type = %self.ad_type, state = %self.state, "Load failure outside a load");
                }
                self.record_error(error.as_ref(), "load failed");
            }
            VendorCallback::ShowSucceeded(_) => {
                if self.state.is_ready() {
                    self.transition(AdUnitState::Showing);
                }
            }
            VendorCallback::ShowFailed { error, .. } => {
                if matches!(self.state, AdUnitState::Ready | AdUnitState::Showing) {
                    self.transition(AdUnitState::ShowFailed);
                }
                self.record_error(error.as_ref(), "show failed");
            }
            VendorCallback::Closed(_) => {
                if !self.state.accepts_close() {
                    debug!(ad_type = %self.ad_type, state = %self.state, "Close without a show, dropped");
                    return None;
                }
                self.transition(AdUnitState::Closed);
                let event = self.normalizer.normalize(self.ad_type, callback);
                self.reload_after_close();
                return event;
            }
            _ => {}
        }

        self.normalizer.normalize(self.ad_type, callback)
    }

    fn is_available(&self) -> bool {
        self.state.is_ready()
    }

    fn state(&self) -> AdUnitState {
        self.state
    }
}

impl std::fmt::Debug for AdUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdUnit")
            .field("ad_type", &self.ad_type)
            .field("ad_unit_id", &self.ad_unit_id)
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .field("vendor_loads", &self.vendor_loads)
            .finish_non_exhaustive()
    }
}
