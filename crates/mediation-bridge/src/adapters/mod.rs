//! # Capability Adapters
//!
//! Implementations of the `AdSdkCapability` port.
//!
//! - `InstrumentedCapability` - wraps any capability with call metrics
//! - `SimulatedSdk` - scriptable stand-in for every SDK generation

pub mod instrumented;
pub mod simulated;

pub use instrumented::InstrumentedCapability;
pub use simulated::{SdkCall, SimulatedSdk};
