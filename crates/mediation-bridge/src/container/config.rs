//! # Bridge Configuration
//!
//! Per-bridge settings. Per-session settings (app key, ad-unit ids, consent
//! flags) arrive with each `init` call instead.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AD_LOAD_FAILURE_PHASE` | `legacy` | `legacy` reports load failures as `show`, `dedicated` as `loadFailed` |
//! | `AD_FORWARD_LIFECYCLE` | profile | Force pause/resume forwarding on (`true`) or off (`false`) |

use std::env;

use ad_unit::{CapabilityProfile, EventNormalizer, LoadFailurePhase};

use crate::errors::BridgeError;

/// Complete bridge configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Phase used for load failures.
    pub load_failure_phase: LoadFailurePhase,
    /// Overrides the capability profile's lifecycle forwarding when set.
    pub forward_lifecycle: Option<bool>,
}

impl BridgeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("AD_LOAD_FAILURE_PHASE") {
            config.load_failure_phase =
                value.parse().map_err(|_| BridgeError::InvalidEnv {
                    var: "AD_LOAD_FAILURE_PHASE",
                    value,
                })?;
        }

        if let Some(value) = lookup("AD_FORWARD_LIFECYCLE") {
            config.forward_lifecycle = Some(match value.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(BridgeError::InvalidEnv {
                        var: "AD_FORWARD_LIFECYCLE",
                        value,
                    })
                }
            });
        }

        Ok(config)
    }

    /// The normalizer implied by this configuration.
    #[must_use]
    pub fn normalizer(&self) -> EventNormalizer {
        EventNormalizer::new(self.load_failure_phase)
    }

    /// Whether pause/resume reach the SDK for `profile`.
    #[must_use]
    pub fn forwards_lifecycle(&self, profile: &CapabilityProfile) -> bool {
        self.forward_lifecycle.unwrap_or(profile.forwards_lifecycle)
    }
}
