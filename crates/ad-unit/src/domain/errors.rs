//! Ad-unit error types.

use super::state::AdUnitState;
use crate::ports::CapabilityError;
use ad_types::AdType;
use thiserror::Error;

/// Ad-unit error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdUnitError {
    /// A show was requested outside `Ready`.
    #[error("{ad_type} cannot show while {state}")]
    NotReady { ad_type: AdType, state: AdUnitState },

    /// The vendor reports no ad even though the unit is `Ready`.
    #[error("{ad_type} is ready but the SDK has no ad")]
    VendorNotReady { ad_type: AdType },

    /// The capability failed synchronously.
    #[error("SDK call failed: {0}")]
    Capability(#[from] CapabilityError),
}
