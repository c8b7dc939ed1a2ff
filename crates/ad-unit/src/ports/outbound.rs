//! Outbound (Driven) ports for the ad-unit subsystem.
//!
//! The vendor SDK is a black box: the bridge only sees `AdSdkCapability` and
//! receives lifecycle callbacks through a `VendorCallbackSink` it hands to
//! `initialize`.

use ad_types::{AdType, AdUnitId, VendorCallback, VendorError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Metadata key carrying the COPPA flag.
pub const METADATA_COPPA: &str = "is_coppa";

/// Metadata key carrying the CCPA do-not-sell flag.
pub const METADATA_DO_NOT_SELL: &str = "do_not_sell";

/// How initialization completion is signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitHandshake {
    /// `initialize` returning `Ok` means the SDK is ready.
    Synchronous,
    /// Completion arrives later as `InitCompleted` / `InitFailed`.
    Asynchronous,
}

/// Observed SDK generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkGeneration {
    /// One static listener per ad type; rewarded video loaded by the vendor.
    StaticListener,
    /// Listener objects per ad unit; asynchronous init completion.
    PerUnitListener,
    /// Ad-unit objects keyed by id; explicit loads, no lifecycle forwarding.
    AdUnitObjects,
}

impl SdkGeneration {
    /// The behavioural profile of this generation.
    #[must_use]
    pub const fn profile(self) -> CapabilityProfile {
        match self {
            Self::StaticListener => CapabilityProfile {
                generation: self,
                init_handshake: InitHandshake::Synchronous,
                requires_ad_unit_ids: false,
                rewarded_auto_load: true,
                forwards_lifecycle: true,
            },
            Self::PerUnitListener => CapabilityProfile {
                generation: self,
                init_handshake: InitHandshake::Asynchronous,
                requires_ad_unit_ids: false,
                rewarded_auto_load: true,
                forwards_lifecycle: true,
            },
            Self::AdUnitObjects => CapabilityProfile {
                generation: self,
                init_handshake: InitHandshake::Asynchronous,
                requires_ad_unit_ids: true,
                rewarded_auto_load: false,
                forwards_lifecycle: false,
            },
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticListener => "static-listener",
            Self::PerUnitListener => "per-unit-listener",
            Self::AdUnitObjects => "ad-unit-objects",
        }
    }
}

impl fmt::Display for SdkGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SdkGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static-listener" | "static" | "1" => Ok(Self::StaticListener),
            "per-unit-listener" | "per-unit" | "2" => Ok(Self::PerUnitListener),
            "ad-unit-objects" | "objects" | "3" => Ok(Self::AdUnitObjects),
            other => Err(format!("unknown SDK generation: {other}")),
        }
    }
}

/// What the bridge needs to know about a capability's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProfile {
    pub generation: SdkGeneration,
    pub init_handshake: InitHandshake,
    /// Ad units exist only for ad types with a configured id.
    pub requires_ad_unit_ids: bool,
    /// The vendor loads rewarded video on its own; explicit loads are skipped.
    pub rewarded_auto_load: bool,
    /// Pause/resume must be forwarded to the SDK.
    pub forwards_lifecycle: bool,
}

impl CapabilityProfile {
    /// Whether the vendor loads `ad_type` without being asked.
    #[must_use]
    pub fn vendor_loads(&self, ad_type: AdType) -> bool {
        ad_type == AdType::RewardedVideo && self.rewarded_auto_load
    }
}

/// Error raised synchronously by a capability call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct CapabilityError {
    pub code: i32,
    pub message: String,
}

impl CapabilityError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CapabilityError> for VendorError {
    fn from(err: CapabilityError) -> Self {
        VendorError {
            code: err.code,
            message: Some(err.message),
        }
    }
}

/// Arguments of `AdSdkCapability::initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRequest {
    pub app_key: String,
    /// Ad types the SDK should prepare.
    pub ad_types: Vec<AdType>,
}

/// Channel through which the vendor reports lifecycle callbacks.
///
/// May be called from any thread, at any time, including after the bridge
/// has torn down.
pub trait VendorCallbackSink: Send + Sync {
    fn deliver(&self, callback: VendorCallback);
}

/// The vendor SDK surface, one implementation per generation.
///
/// Every method must return promptly; completion of loads and shows is
/// reported through the callback sink.
pub trait AdSdkCapability: Send + Sync {
    /// Describes the generation this capability wraps.
    fn profile(&self) -> CapabilityProfile;

    fn set_adapters_debug(&self, enabled: bool);

    fn set_consent(&self, has_user_consent: bool);

    fn set_metadata(&self, key: &str, value: &str);

    fn set_user_id(&self, user_id: &str);

    /// Start the SDK. Callbacks for this session go to `callbacks`.
    ///
    /// # Errors
    /// Any synchronous failure is reported as an init failure.
    fn initialize(
        &self,
        request: &InitRequest,
        callbacks: Arc<dyn VendorCallbackSink>,
    ) -> Result<(), CapabilityError>;

    fn load_ad(&self, ad_type: AdType, ad_unit_id: Option<&AdUnitId>)
        -> Result<(), CapabilityError>;

    fn show_ad(
        &self,
        ad_type: AdType,
        ad_unit_id: Option<&AdUnitId>,
        placement: Option<&str>,
    ) -> Result<(), CapabilityError>;

    /// The vendor's own readiness answer.
    fn is_ready(&self, ad_type: AdType, ad_unit_id: Option<&AdUnitId>) -> bool;

    fn on_pause(&self) {}

    fn on_resume(&self) {}
}
