//! # Runtime Wiring
//!
//! Everything that reaches the runtime task travels as a `Command` over one
//! unbounded channel: host calls from `MediationBridge` and vendor callbacks
//! from `SessionCallbackSink`.
//!
//! ```text
//! MediationBridge ──Init/Load/Show/Pause/Resume/Query──┐
//!                                                      ├──▶ mpsc ──▶ BridgeRuntime
//! SessionCallbackSink ──Vendor{session, callback}──────┘
//! ```

pub mod callbacks;
pub mod commands;

pub use callbacks::SessionCallbackSink;
pub use commands::Command;
