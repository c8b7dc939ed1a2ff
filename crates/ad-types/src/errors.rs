//! Usage errors raised while interpreting host input.

use thiserror::Error;

/// Malformed arguments coming from the scripting host.
///
/// These never become events: the caller either has no listener yet or the
/// call is synchronous, so they are logged and returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `options.key` was absent or empty.
    #[error("options.key (appKey) is required")]
    MissingAppKey,

    /// An ad unit type tag the bridge does not know.
    #[error("unknown adUnitType: {0}")]
    UnknownAdType(String),

    /// The options table could not be decoded.
    #[error("malformed options table: {0}")]
    MalformedOptions(String),
}
