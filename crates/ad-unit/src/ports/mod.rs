//! Ports (Hexagonal Architecture)
//!
//! - `inbound`: the API the bridge drives an ad unit through
//! - `outbound`: the vendor SDK capability and its callback channel

pub mod inbound;
pub mod outbound;

pub use inbound::AdUnitApi;
pub use outbound::{
    AdSdkCapability, CapabilityError, CapabilityProfile, InitHandshake, InitRequest,
    SdkGeneration, VendorCallbackSink, METADATA_COPPA, METADATA_DO_NOT_SELL,
};
