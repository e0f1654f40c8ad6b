//! Retention policy and its fluent builder
//!
//! A policy combines:
//! - `keep_last_n`: always keep the N highest version numbers
//! - `tiers`: bucketed time-window rules, unioned together
//! - `bucket_zone`: zone used only to align calendar buckets (UTC by default)

use crate::error::{PolicyError, TierError};
use crate::parse::parse_tier;
use crate::tier::Tier;
use chrono_tz::Tz;

/// Immutable, validated retention policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep_last_n: usize,
    tiers: Vec<Tier>,
    bucket_zone: Tz,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(0, None, None)
    }
}

impl RetentionPolicy {
    /// Create a policy
    ///
    /// Absent tiers normalize to an empty list and an absent zone to UTC.
    pub fn new(keep_last_n: usize, tiers: Option<Vec<Tier>>, bucket_zone: Option<Tz>) -> Self {
        Self {
            keep_last_n,
            tiers: tiers.unwrap_or_default(),
            bucket_zone: bucket_zone.unwrap_or(Tz::UTC),
        }
    }

    /// Create a policy bucketing in UTC
    pub fn utc(keep_last_n: usize, tiers: Vec<Tier>) -> Self {
        Self::new(keep_last_n, Some(tiers), Some(Tz::UTC))
    }

    /// Start a builder with default settings
    pub fn builder() -> RetentionPolicyBuilder {
        RetentionPolicyBuilder::new()
    }

    /// Count of highest version numbers always retained
    pub fn keep_last_n(&self) -> usize {
        self.keep_last_n
    }

    /// Tiers in insertion order
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Zone used to align calendar buckets
    pub fn bucket_zone(&self) -> Tz {
        self.bucket_zone
    }
}

/// Fluent builder for [`RetentionPolicy`]
///
/// Defaults: `keep_last_n = 0`, `bucket_zone = UTC`, no tiers.
///
/// # Examples
///
/// ```
/// use keepsake_domain::RetentionPolicy;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let policy = RetentionPolicy::builder()
///     .keep_last_n(10)
///     .add_tier_spec("PT48H", "PT1H")?
///     .add_tier_spec("P7D", "P1D")?
///     .add_tier_spec("P12M", "P1M")?
///     .add_tier_spec("P5Y", "P1Y")?
///     .build();
///
/// assert_eq!(policy.keep_last_n(), 10);
/// assert_eq!(policy.tiers().len(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetentionPolicyBuilder {
    keep_last_n: usize,
    bucket_zone: Tz,
    tiers: Vec<Tier>,
}

impl Default for RetentionPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetentionPolicyBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self {
            keep_last_n: 0,
            bucket_zone: Tz::UTC,
            tiers: Vec::new(),
        }
    }

    /// Always keep the `n` highest version numbers
    pub fn keep_last_n(&mut self, n: usize) -> &mut Self {
        self.keep_last_n = n;
        self
    }

    /// Set `keep_last_n` from a signed value
    ///
    /// # Errors
    /// Returns an error if `n` is negative
    pub fn keep_last_n_checked(&mut self, n: i64) -> Result<&mut Self, PolicyError> {
        let n = usize::try_from(n).map_err(|_| PolicyError::NegativeKeepLastN(n))?;
        Ok(self.keep_last_n(n))
    }

    /// Zone used only for calendar bucketing (UTC recommended)
    pub fn bucket_zone(&mut self, zone: Tz) -> &mut Self {
        self.bucket_zone = zone;
        self
    }

    /// Set the bucket zone from an IANA name such as `Europe/Berlin`
    ///
    /// # Errors
    /// Returns an error if the name is not a known zone
    pub fn bucket_zone_named(&mut self, name: &str) -> Result<&mut Self, PolicyError> {
        let zone = parse_zone(name)?;
        Ok(self.bucket_zone(zone))
    }

    /// Add an already-constructed tier
    pub fn add_tier(&mut self, tier: Tier) -> &mut Self {
        self.tiers.push(tier);
        self
    }

    /// Add a tier from ISO-8601 window/bucket expressions
    ///
    /// Fixed: `PT48H`/`PT1H`, `P7D`/`P1D`, `P1DT2H`/`PT1H`.
    /// Calendar: `P12M`/`P1M`, `P5Y`/`P1Y`.
    ///
    /// # Errors
    /// Returns the parse error; the builder is left unchanged
    pub fn add_tier_spec(&mut self, window: &str, bucket: &str) -> Result<&mut Self, TierError> {
        let tier = parse_tier(window, bucket)?;
        Ok(self.add_tier(tier))
    }

    /// Add several tiers
    pub fn add_tiers<I>(&mut self, tiers: I) -> &mut Self
    where
        I: IntoIterator<Item = Tier>,
    {
        self.tiers.extend(tiers);
        self
    }

    /// Snapshot the current settings into a policy
    ///
    /// The builder can keep being used; later changes do not affect policies
    /// built earlier.
    pub fn build(&self) -> RetentionPolicy {
        RetentionPolicy::new(
            self.keep_last_n,
            Some(self.tiers.clone()),
            Some(self.bucket_zone),
        )
    }
}

/// Parse an IANA zone name
///
/// # Errors
/// Returns [`PolicyError::UnknownZone`] for names chrono-tz does not know
pub fn parse_zone(name: &str) -> Result<Tz, PolicyError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| PolicyError::UnknownZone {
            zone: name.to_string(),
            message: e.to_string(),
        })
}
