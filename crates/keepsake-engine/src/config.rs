//! Configuration for retention policies and pruning
//!
//! Policies are usually written as TOML with ISO-8601 tier expressions:
//!
//! ```toml
//! keep_last_n = 10
//! bucket_zone = "UTC"
//!
//! [[tiers]]
//! window = "PT48H"
//! bucket = "PT1H"
//!
//! [[tiers]]
//! window = "P12M"
//! bucket = "P1M"
//! ```

use crate::EngineError;
use keepsake_domain::{parse_zone, PolicyError, RetentionPolicy, RetentionPolicyBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One textual tier definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// How far back the tier applies (`PT48H`, `P7D`, `P12M`, ...)
    pub window: String,

    /// Bucket granularity within the window (`PT1H`, `P1D`, `P1M`, ...)
    pub bucket: String,
}

impl TierSpec {
    /// Create a tier spec from window and bucket expressions
    pub fn new(window: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            window: window.into(),
            bucket: bucket.into(),
        }
    }
}

/// Serializable form of a [`RetentionPolicy`]
///
/// # Examples
///
/// ```
/// use keepsake_engine::PolicyConfig;
///
/// // Keep the last 10 versions, hourly for 2 days, daily for a week,
/// // monthly for a year and yearly for 5 years
/// let config = PolicyConfig::standard();
/// let policy = config.to_policy().unwrap();
/// assert_eq!(policy.keep_last_n(), 10);
/// assert_eq!(policy.tiers().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Always keep this many of the highest version numbers
    /// Default: 0
    #[serde(default)]
    pub keep_last_n: i64,

    /// IANA zone used to align calendar buckets
    /// Default: "UTC"
    #[serde(default = "default_bucket_zone")]
    pub bucket_zone: String,

    /// Tier definitions, unioned
    #[serde(default)]
    pub tiers: Vec<TierSpec>,
}

fn default_bucket_zone() -> String {
    "UTC".to_string()
}

impl Default for PolicyConfig {
    /// Empty policy: keep only the current version
    fn default() -> Self {
        Self {
            keep_last_n: 0,
            bucket_zone: default_bucket_zone(),
            tiers: Vec::new(),
        }
    }
}

impl PolicyConfig {
    /// Grandfather-father-son style retention
    ///
    /// - Last 10 versions
    /// - Hourly for 48 hours
    /// - Daily for 7 days
    /// - Monthly for 12 months
    /// - Yearly for 5 years
    pub fn standard() -> Self {
        Self {
            keep_last_n: 10,
            bucket_zone: default_bucket_zone(),
            tiers: vec![
                TierSpec::new("PT48H", "PT1H"),
                TierSpec::new("P7D", "P1D"),
                TierSpec::new("P12M", "P1M"),
                TierSpec::new("P5Y", "P1Y"),
            ],
        }
    }

    /// Small footprint retention for constrained stores
    ///
    /// - Last 3 versions
    /// - Hourly for 24 hours
    /// - Daily for 14 days
    /// - Monthly for 6 months
    pub fn compact() -> Self {
        Self {
            keep_last_n: 3,
            bucket_zone: default_bucket_zone(),
            tiers: vec![
                TierSpec::new("PT24H", "PT1H"),
                TierSpec::new("P14D", "P1D"),
                TierSpec::new("P6M", "P1M"),
            ],
        }
    }

    /// Look up a preset by name (`standard`, `compact`)
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "compact" => Some(Self::compact()),
            _ => None,
        }
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the text is not valid TOML or does
    /// not match the expected shape
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Render as TOML text
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if serialization fails
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Validate and convert into a [`RetentionPolicy`]
    ///
    /// # Errors
    /// Returns an error for a negative `keep_last_n`, an unknown zone, or a
    /// tier that fails to parse
    pub fn to_policy(&self) -> Result<RetentionPolicy, PolicyError> {
        let mut builder = RetentionPolicyBuilder::new();
        builder
            .keep_last_n_checked(self.keep_last_n)?
            .bucket_zone(parse_zone(&self.bucket_zone)?);

        for spec in &self.tiers {
            builder.add_tier_spec(&spec.window, &spec.bucket)?;
        }

        Ok(builder.build())
    }
}

/// Configuration for a [`Pruner`](crate::Pruner) and its background worker
///
/// ```toml
/// dry_run = false
/// sweep_interval_minutes = 60
///
/// [policy]
/// keep_last_n = 10
///
/// [[policy.tiers]]
/// window = "P12M"
/// bucket = "P1M"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunerConfig {
    /// Retention policy to apply
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Log what would be deleted without deleting
    /// Default: true
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// How often the background worker prunes (in minutes)
    /// Default: 60
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

fn default_dry_run() -> bool {
    true
}

fn default_sweep_interval_minutes() -> u64 {
    60
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            dry_run: default_dry_run(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

impl PrunerConfig {
    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the text is not valid TOML or does
    /// not match the expected shape
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Check the sweep interval and the policy
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for a zero interval and
    /// [`EngineError::Policy`] for an invalid policy
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sweep_interval_minutes == 0 {
            return Err(EngineError::Config(
                "sweep_interval_minutes must be >= 1".to_string(),
            ));
        }
        self.policy.to_policy()?;
        Ok(())
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_domain::TierKind;

    #[test]
    fn test_default_config() {
        let config = PolicyConfig::default();
        assert_eq!(config.keep_last_n, 0);
        assert_eq!(config.bucket_zone, "UTC");
        assert!(config.tiers.is_empty());

        let pruner = PrunerConfig::default();
        assert!(pruner.dry_run);
        assert_eq!(pruner.sweep_interval_minutes, 60);
    }

    #[test]
    fn test_standard_preset() {
        let policy = PolicyConfig::standard().to_policy().unwrap();
        assert_eq!(policy.keep_last_n(), 10);
        let kinds: Vec<TierKind> = policy.tiers().iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                TierKind::Duration,
                TierKind::Duration,
                TierKind::Period,
                TierKind::Period
            ]
        );
    }

    #[test]
    fn test_compact_preset() {
        let policy = PolicyConfig::compact().to_policy().unwrap();
        assert_eq!(policy.keep_last_n(), 3);
        assert_eq!(policy.tiers().len(), 3);
        assert!(PolicyConfig::compact().keep_last_n < PolicyConfig::standard().keep_last_n);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(PolicyConfig::preset("Standard"), Some(PolicyConfig::standard()));
        assert_eq!(PolicyConfig::preset("compact"), Some(PolicyConfig::compact()));
        assert_eq!(PolicyConfig::preset("forever"), None);
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
            keep_last_n = 4
            bucket_zone = "Europe/Berlin"

            [[tiers]]
            window = "PT48H"
            bucket = "PT1H"

            [[tiers]]
            window = "P12M"
            bucket = "P1M"
        "#;

        let config = PolicyConfig::from_toml_str(text).unwrap();
        assert_eq!(config.keep_last_n, 4);
        assert_eq!(config.tiers[1], TierSpec::new("P12M", "P1M"));

        let policy = config.to_policy().unwrap();
        assert_eq!(policy.bucket_zone(), chrono_tz::Europe::Berlin);
        assert_eq!(policy.tiers().len(), 2);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = PolicyConfig::from_toml_str("").unwrap();
        assert_eq!(config, PolicyConfig::default());

        let pruner = PrunerConfig::from_toml_str("dry_run = false").unwrap();
        assert!(!pruner.dry_run);
        assert_eq!(pruner.policy, PolicyConfig::default());
    }

    #[test]
    fn test_negative_keep_last_n_rejected() {
        let config = PolicyConfig {
            keep_last_n: -2,
            ..Default::default()
        };
        assert_eq!(
            config.to_policy().unwrap_err(),
            PolicyError::NegativeKeepLastN(-2)
        );
    }

    #[test]
    fn test_bad_zone_and_tier_rejected() {
        let config = PolicyConfig {
            bucket_zone: "Nowhere/Special".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.to_policy(),
            Err(PolicyError::UnknownZone { .. })
        ));

        let config = PolicyConfig {
            tiers: vec![TierSpec::new("P1Y", "P1D")],
            ..Default::default()
        };
        assert!(matches!(config.to_policy(), Err(PolicyError::Tier(_))));
    }

    #[test]
    fn test_pruner_config_validation() {
        let config = PrunerConfig {
            sweep_interval_minutes: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));

        let config = PrunerConfig {
            policy: PolicyConfig {
                keep_last_n: -1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Policy(_))));

        assert!(PrunerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PolicyConfig::standard();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[[tiers]]"));
        assert_eq!(PolicyConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_duration_conversion() {
        let config = PrunerConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(60 * 60));
    }
}
