//! # Ad Types Crate
//!
//! Value types that cross crate boundaries inside the mediation bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: ad types, host options, vendor callback shapes
//!   and the normalized event are defined once, here.
//! - **One Event Shape**: `NormalizedEvent` is the only payload ever handed to
//!   the host listener, whatever SDK generation produced the callback.
//! - **Usage Errors Are Values**: malformed host input becomes a
//!   `ConfigError`, never a panic.

pub mod entities;
pub mod errors;
pub mod events;
pub mod options;
pub mod vendor;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use options::*;
pub use vendor::*;

/// Event name stamped on every table dispatched to the host listener.
pub const EVENT_NAME: &str = "adMediation";

/// Type tag used for initialization events.
pub const INIT_EVENT_TYPE: &str = "init";
