//! Domain layer for the ad-unit subsystem.

pub mod ad_unit;
pub mod errors;
pub mod normalizer;
pub mod state;

pub use ad_unit::AdUnit;
pub use errors::AdUnitError;
pub use normalizer::{EventNormalizer, LoadFailurePhase};
pub use state::AdUnitState;
