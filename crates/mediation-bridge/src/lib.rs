//! # Mediation Bridge Library
//!
//! Exposes one version-stable API (`init`, `load`, `show`, `is_available`)
//! over whatever vendor SDK generation the host plugs in.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: the vendor SDK is the `AdSdkCapability`
//!   port; `adapters/` holds implementations
//! - **Single Serialized Context**: every host call and every vendor callback
//!   is marshalled onto one runtime task before touching ad-unit state
//! - **One Event Contract**: vendor callbacks become `NormalizedEvent`s,
//!   delivered to exactly one listener
//!
//! ## Layout
//!
//! - `bridge` - `MediationBridge`, the host-facing handle
//! - `container/` - bridge configuration
//! - `wiring/` - commands and the vendor callback sink feeding the runtime
//! - `handlers/` - the runtime task owning ad units and the event sink
//! - `adapters/` - `SimulatedSdk`, a scriptable capability
//!
//! ```text
//! host ──init/load/show──┐
//!                        ├──▶ [command channel] ──▶ BridgeRuntime ──▶ EventSink ──▶ listener
//! vendor threads ──cb────┘                              │
//!                                                       └──▶ AdUnit ──▶ AdSdkCapability
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod bridge;
pub mod container;
pub mod errors;
pub mod handlers;
pub mod wiring;

pub use adapters::{SdkCall, SimulatedSdk};
pub use bridge::MediationBridge;
pub use container::BridgeConfig;
pub use errors::BridgeError;
pub use handlers::BridgeRuntime;
