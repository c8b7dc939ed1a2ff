//! # Handlers
//!
//! The runtime task that processes bridge commands.

pub mod runtime;

pub use runtime::{BridgeRuntime, ReadinessSnapshot};
