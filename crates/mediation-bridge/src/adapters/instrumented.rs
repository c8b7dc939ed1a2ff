//! Metrics decorator around a vendor capability.

use ad_types::{AdType, AdUnitId};
use ad_unit::{AdSdkCapability, CapabilityError, CapabilityProfile, InitRequest, VendorCallbackSink};
use mediation_telemetry::CAPABILITY_CALLS;
use std::sync::Arc;
use tracing::debug;

/// Counts every call into the wrapped capability.
pub struct InstrumentedCapability {
    inner: Arc<dyn AdSdkCapability>,
}

impl InstrumentedCapability {
    pub fn new(inner: Arc<dyn AdSdkCapability>) -> Self {
        Self { inner }
    }

    fn record(operation: &'static str) {
        CAPABILITY_CALLS.with_label_values(&[operation]).inc();
    }
}

impl AdSdkCapability for InstrumentedCapability {
    fn profile(&self) -> CapabilityProfile {
        self.inner.profile()
    }

    fn set_adapters_debug(&self, enabled: bool) {
        Self::record("set_adapters_debug");
        self.inner.set_adapters_debug(enabled);
    }

    fn set_consent(&self, has_user_consent: bool) {
        Self::record("set_consent");
        self.inner.set_consent(has_user_consent);
    }

    fn set_metadata(&self, key: &str, value: &str) {
        Self::record("set_metadata");
        self.inner.set_metadata(key, value);
    }

    fn set_user_id(&self, user_id: &str) {
        Self::record("set_user_id");
        self.inner.set_user_id(user_id);
    }

    fn initialize(
        &self,
        request: &InitRequest,
        callbacks: Arc<dyn VendorCallbackSink>,
    ) -> Result<(), CapabilityError> {
        Self::record("initialize");
        debug!(ad_types = ?request.ad_types, "Initializing vendor SDK");
        self.inner.initialize(request, callbacks)
    }

    fn load_ad(&self, ad_type: AdType, ad_unit_id: Option<&AdUnitId>) -> Result<(), CapabilityError> {
        Self::record("load");
        debug!(ad_type = %ad_type, "Vendor load");
        self.inner.load_ad(ad_type, ad_unit_id)
    }

    fn show_ad(
        &self,
        ad_type: AdType,
        ad_unit_id: Option<&AdUnitId>,
        placement: Option<&str>,
    ) -> Result<(), CapabilityError> {
        Self::record("show");
        debug!(ad_type = %ad_type, placement = ?placement, "Vendor show");
        self.inner.show_ad(ad_type, ad_unit_id, placement)
    }

    fn is_ready(&self, ad_type: AdType, ad_unit_id: Option<&AdUnitId>) -> bool {
        self.inner.is_ready(ad_type, ad_unit_id)
    }

    fn on_pause(&self) {
        Self::record("pause");
        self.inner.on_pause();
    }

    fn on_resume(&self) {
        Self::record("resume");
        self.inner.on_resume();
    }
}
