//! # Bridge Container
//!
//! Configuration for a bridge instance.

pub mod config;

pub use config::BridgeConfig;
