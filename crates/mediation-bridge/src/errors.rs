//! Bridge error types.

use ad_types::ConfigError;
use thiserror::Error;

/// Errors returned to Rust callers of the bridge.
///
/// Routing failures (unknown or not yet constructed units) are not errors:
/// they are logged inside the runtime and the call becomes a no-op.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Malformed host input.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bridge was torn down.
    #[error("mediation bridge has shut down")]
    ShutDown,

    /// An environment variable held a value the bridge cannot use.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}
