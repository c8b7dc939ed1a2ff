//! # Ad Unit Subsystem
//!
//! Per-ad-type lifecycle state machine, the vendor event normalizer, and the
//! ports through which the bridge talks to a vendor SDK generation.
//!
//! ## State Machine
//!
//! ```text
//! [Uninitialized] ──load──→ [Loading] ──loaded──→ [Ready] ──show──→ [Showing]
//!                              ↑  │                  │                 │
//!                              │  └─load failed─→ [LoadFailed]         │
//!                              │                     └──show failed─→ [ShowFailed]
//!                              │                                       │
//!                              └──────── auto reload ←── [Closed] ←──close
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Available iff `Ready` | `domain/ad_unit.rs` - `is_available()` |
//! | No duplicate concurrent loads | `domain/state.rs` - `accepts_load()` |
//! | Show only from `Ready` | `domain/ad_unit.rs` - `request_show()` |
//! | Close triggers reload | `domain/ad_unit.rs` - `handle_callback()` |
//! | Close only after a show | `domain/state.rs` - `accepts_close()` |
//! | At most one event per callback | `domain/normalizer.rs` - `Option` return |
//!
//! ## Generations
//!
//! The state machine is written once against `ports::AdSdkCapability`. What
//! differs between SDK generations is captured by `CapabilityProfile`: the
//! init handshake, whether ad-unit ids are mandatory, which ad types the
//! vendor loads on its own, and whether pause/resume must be forwarded.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;

pub use domain::{AdUnit, AdUnitError, AdUnitState, EventNormalizer, LoadFailurePhase};
pub use ports::{
    AdSdkCapability, AdUnitApi, CapabilityError, CapabilityProfile, InitHandshake, InitRequest,
    SdkGeneration, VendorCallbackSink, METADATA_COPPA, METADATA_DO_NOT_SELL,
};
