//! # Host Options
//!
//! Option tables passed by the scripting host to `init` and `show`.
//!
//! | Host key | Field | Default |
//! |----------|-------|---------|
//! | `key` | `app_key` | required |
//! | `interstitialAdUnitId` | `interstitial_ad_unit_id` | none |
//! | `rewardedVideoAdUnitId` | `rewarded_ad_unit_id` | none |
//! | `userId` | `user_id` | none |
//! | `hasUserConsent` | `has_user_consent` | `false` |
//! | `coppaUnderAge` | `coppa_under_age` | `false` |
//! | `ccpaDoNotSell` | `ccpa_do_not_sell` | `false` |
//! | `showDebugLog` | `debug_logging_enabled` | `false` |

use crate::entities::{AdType, AdUnitId};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Raw `init` options as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    #[serde(rename = "key")]
    pub app_key: Option<String>,
    #[serde(rename = "interstitialAdUnitId")]
    pub interstitial_ad_unit_id: Option<String>,
    #[serde(rename = "rewardedVideoAdUnitId")]
    pub rewarded_ad_unit_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "hasUserConsent")]
    pub has_user_consent: bool,
    #[serde(rename = "coppaUnderAge")]
    pub coppa_under_age: bool,
    #[serde(rename = "ccpaDoNotSell")]
    pub ccpa_do_not_sell: bool,
    #[serde(rename = "showDebugLog")]
    pub debug_logging_enabled: bool,
}

impl InitOptions {
    /// Options with only the app key set.
    #[must_use]
    pub fn with_app_key(app_key: impl Into<String>) -> Self {
        Self {
            app_key: Some(app_key.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn interstitial(mut self, ad_unit_id: impl Into<String>) -> Self {
        self.interstitial_ad_unit_id = Some(ad_unit_id.into());
        self
    }

    #[must_use]
    pub fn rewarded(mut self, ad_unit_id: impl Into<String>) -> Self {
        self.rewarded_ad_unit_id = Some(ad_unit_id.into());
        self
    }

    /// Decode the host's options table.
    pub fn from_host_table(table: &serde_json::Value) -> Result<Self, ConfigError> {
        if !table.is_object() {
            return Err(ConfigError::MalformedOptions(
                "second argument must be an options table".into(),
            ));
        }
        serde_json::from_value(table.clone())
            .map_err(|e| ConfigError::MalformedOptions(e.to_string()))
    }

    /// Check the options and freeze them.
    ///
    /// # Errors
    /// - `MissingAppKey`: `key` absent or empty
    pub fn validate(self) -> Result<ValidatedInitOptions, ConfigError> {
        let app_key = match self.app_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ConfigError::MissingAppKey),
        };

        Ok(ValidatedInitOptions {
            app_key,
            interstitial_ad_unit_id: self.interstitial_ad_unit_id.and_then(AdUnitId::new),
            rewarded_ad_unit_id: self.rewarded_ad_unit_id.and_then(AdUnitId::new),
            user_id: self.user_id.filter(|id| !id.is_empty()),
            privacy: PrivacySettings {
                has_user_consent: self.has_user_consent,
                coppa_under_age: self.coppa_under_age,
                ccpa_do_not_sell: self.ccpa_do_not_sell,
            },
            debug_logging_enabled: self.debug_logging_enabled,
        })
    }
}

/// Consent and privacy flags that must reach the SDK before it initializes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivacySettings {
    pub has_user_consent: bool,
    pub coppa_under_age: bool,
    pub ccpa_do_not_sell: bool,
}

/// Init options after validation. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInitOptions {
    app_key: String,
    interstitial_ad_unit_id: Option<AdUnitId>,
    rewarded_ad_unit_id: Option<AdUnitId>,
    user_id: Option<String>,
    privacy: PrivacySettings,
    debug_logging_enabled: bool,
}

impl ValidatedInitOptions {
    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// The configured ad-unit id for `ad_type`, if any.
    #[must_use]
    pub fn ad_unit_id(&self, ad_type: AdType) -> Option<&AdUnitId> {
        match ad_type {
            AdType::Interstitial => self.interstitial_ad_unit_id.as_ref(),
            AdType::RewardedVideo => self.rewarded_ad_unit_id.as_ref(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn privacy(&self) -> PrivacySettings {
        self.privacy
    }

    #[must_use]
    pub fn debug_logging_enabled(&self) -> bool {
        self.debug_logging_enabled
    }
}

/// Options accepted by `show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowOptions {
    #[serde(rename = "placementName")]
    pub placement_name: Option<String>,
}

impl ShowOptions {
    #[must_use]
    pub fn placement(name: impl Into<String>) -> Self {
        Self {
            placement_name: Some(name.into()),
        }
    }

    /// Decode the optional second argument of `show`. Non-tables are ignored.
    #[must_use]
    pub fn from_host_table(table: Option<&serde_json::Value>) -> Self {
        table
            .filter(|t| t.is_object())
            .and_then(|t| serde_json::from_value(t.clone()).ok())
            .unwrap_or_default()
    }

    /// The placement name, with empty names treated as absent.
    #[must_use]
    pub fn placement_name(&self) -> Option<&str> {
        self.placement_name.as_deref().filter(|name| !name.is_empty())
    }
}
