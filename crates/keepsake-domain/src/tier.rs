//! Tier module - retention rules made of a window and a bucket granularity
//!
//! A tier keeps exactly one version per bucket for every bucket that falls
//! within its window. Two closed variants exist:
//! - [`FixedTier`]: elapsed-time window and bucket (hours, days, seconds)
//! - [`CalendarTier`]: calendar window and bucket (months, years)

use crate::error::TierError;
use chrono::TimeDelta;
use std::fmt;

/// Kind of span a textual tier expression resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    /// Elapsed time (`PT48H`, `P7D`, `P1DT2H`)
    Duration,

    /// Calendar time (`P12M`, `P1Y`)
    Period,
}

impl TierKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Duration => "Duration",
            TierKind::Period => "Period",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar span in years, months, and days
///
/// Unlike an elapsed duration, a period is applied with calendar arithmetic:
/// subtracting one month from March 31st lands on the last day of February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CalendarPeriod {
    /// Whole years
    pub years: i32,
    /// Whole months
    pub months: i32,
    /// Whole days
    pub days: i32,
}

impl CalendarPeriod {
    /// Create a period from its components
    pub const fn new(years: i32, months: i32, days: i32) -> Self {
        Self { years, months, days }
    }

    /// A period of `years` years
    pub const fn years(years: i32) -> Self {
        Self::new(years, 0, 0)
    }

    /// A period of `months` months
    pub const fn months(months: i32) -> Self {
        Self::new(0, months, 0)
    }

    /// A period of `days` days
    pub const fn days(days: i32) -> Self {
        Self::new(0, 0, days)
    }

    /// All components are zero
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Any component is negative
    pub fn is_negative(&self) -> bool {
        self.years < 0 || self.months < 0 || self.days < 0
    }

    /// Years and months folded into a month count
    pub fn total_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }

    /// Exactly one calendar month
    pub fn is_one_month(&self) -> bool {
        *self == Self::months(1)
    }

    /// Exactly one calendar year
    pub fn is_one_year(&self) -> bool {
        *self == Self::years(1)
    }
}

impl fmt::Display for CalendarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

/// Render an elapsed span in ISO-8601 `PTnHnMnS` form
pub fn format_duration(delta: &TimeDelta) -> String {
    if delta.is_zero() {
        return "PT0S".to_string();
    }

    let total_secs = delta.num_seconds();
    let nanos = delta.subsec_nanos();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = String::from("PT");
    if hours != 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes != 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if secs != 0 || nanos != 0 {
        if nanos == 0 {
            out.push_str(&format!("{secs}S"));
        } else {
            let sign = if secs < 0 || nanos < 0 { "-" } else { "" };
            let fraction = format!("{:09}", nanos.unsigned_abs());
            out.push_str(&format!(
                "{sign}{}.{}S",
                secs.abs(),
                fraction.trim_end_matches('0')
            ));
        }
    }
    out
}

/// Tier over elapsed time, bucketed on absolute epoch alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedTier {
    window: TimeDelta,
    bucket: TimeDelta,
}

impl FixedTier {
    /// Create a fixed tier
    ///
    /// # Errors
    /// Returns an error if either the window or the bucket is zero or negative
    pub fn new(window: TimeDelta, bucket: TimeDelta) -> Result<Self, TierError> {
        if window <= TimeDelta::zero() {
            return Err(TierError::InvalidWindow(format_duration(&window)));
        }
        if bucket <= TimeDelta::zero() {
            return Err(TierError::InvalidBucket(format_duration(&bucket)));
        }
        Ok(Self { window, bucket })
    }

    /// How far back from "now" this tier applies
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Bucket size within the window
    pub fn bucket(&self) -> TimeDelta {
        self.bucket
    }
}

/// Tier over calendar time, bucketed on zoned calendar boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarTier {
    window: CalendarPeriod,
    bucket: CalendarPeriod,
}

impl CalendarTier {
    /// Create a calendar tier
    ///
    /// Any non-zero, non-negative bucket is accepted here; which bucket
    /// granularities can actually be evaluated is decided by the engine.
    ///
    /// # Errors
    /// Returns an error if either the window or the bucket is zero or has a
    /// negative component
    pub fn new(window: CalendarPeriod, bucket: CalendarPeriod) -> Result<Self, TierError> {
        if window.is_zero() || window.is_negative() {
            return Err(TierError::InvalidWindow(window.to_string()));
        }
        if bucket.is_zero() || bucket.is_negative() {
            return Err(TierError::InvalidBucket(bucket.to_string()));
        }
        Ok(Self { window, bucket })
    }

    /// How far back from "now" this tier applies
    pub fn window(&self) -> CalendarPeriod {
        self.window
    }

    /// Bucket size within the window
    pub fn bucket(&self) -> CalendarPeriod {
        self.bucket
    }
}

/// A retention tier: exactly one of the two closed variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Elapsed-time tier
    Fixed(FixedTier),

    /// Calendar tier
    Calendar(CalendarTier),
}

impl Tier {
    /// Convenience constructor for a fixed tier
    pub fn fixed(window: TimeDelta, bucket: TimeDelta) -> Result<Self, TierError> {
        FixedTier::new(window, bucket).map(Tier::Fixed)
    }

    /// Convenience constructor for a calendar tier
    pub fn calendar(window: CalendarPeriod, bucket: CalendarPeriod) -> Result<Self, TierError> {
        CalendarTier::new(window, bucket).map(Tier::Calendar)
    }

    /// Which kind of span this tier is expressed in
    pub fn kind(&self) -> TierKind {
        match self {
            Tier::Fixed(_) => TierKind::Duration,
            Tier::Calendar(_) => TierKind::Period,
        }
    }
}

impl From<FixedTier> for Tier {
    fn from(tier: FixedTier) -> Self {
        Tier::Fixed(tier)
    }
}

impl From<CalendarTier> for Tier {
    fn from(tier: CalendarTier) -> Self {
        Tier::Calendar(tier)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Fixed(t) => write!(
                f,
                "{}/{}",
                format_duration(&t.window),
                format_duration(&t.bucket)
            ),
            Tier::Calendar(t) => write!(f, "{}/{}", t.window, t.bucket),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = TierError;

    /// Parse `window/bucket`, e.g. `PT48H/PT1H` or `P12M/P1M`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (window, bucket) = s
            .split_once('/')
            .ok_or_else(|| TierError::MissingInput(format!("expected window/bucket, got '{s}'")))?;
        crate::parse::parse_tier(window, bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tier_rejects_non_positive() {
        assert!(matches!(
            FixedTier::new(TimeDelta::zero(), TimeDelta::hours(1)),
            Err(TierError::InvalidWindow(_))
        ));
        assert!(matches!(
            FixedTier::new(TimeDelta::hours(1), TimeDelta::seconds(-5)),
            Err(TierError::InvalidBucket(_))
        ));
        assert!(FixedTier::new(TimeDelta::hours(48), TimeDelta::hours(1)).is_ok());
    }

    #[test]
    fn test_calendar_tier_rejects_zero_and_negative() {
        assert!(matches!(
            CalendarTier::new(CalendarPeriod::default(), CalendarPeriod::months(1)),
            Err(TierError::InvalidWindow(_))
        ));
        assert!(matches!(
            CalendarTier::new(CalendarPeriod::new(1, -1, 0), CalendarPeriod::months(1)),
            Err(TierError::InvalidWindow(_))
        ));
        assert!(matches!(
            CalendarTier::new(CalendarPeriod::months(12), CalendarPeriod::default()),
            Err(TierError::InvalidBucket(_))
        ));
    }

    #[test]
    fn test_calendar_tier_accepts_unusual_bucket() {
        // Granularity support is an engine concern
        let tier = CalendarTier::new(CalendarPeriod::years(2), CalendarPeriod::months(3)).unwrap();
        assert_eq!(tier.bucket(), CalendarPeriod::months(3));
    }

    #[test]
    fn test_period_display() {
        assert_eq!(CalendarPeriod::months(12).to_string(), "P12M");
        assert_eq!(CalendarPeriod::new(1, 2, 3).to_string(), "P1Y2M3D");
        assert_eq!(CalendarPeriod::default().to_string(), "P0D");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&TimeDelta::hours(48)), "PT48H");
        assert_eq!(format_duration(&TimeDelta::seconds(90)), "PT1M30S");
        assert_eq!(format_duration(&TimeDelta::milliseconds(1500)), "PT1.5S");
        assert_eq!(format_duration(&TimeDelta::zero()), "PT0S");
    }

    #[test]
    fn test_tier_display_and_kind() {
        let fixed = Tier::fixed(TimeDelta::days(7), TimeDelta::days(1)).unwrap();
        assert_eq!(fixed.kind(), TierKind::Duration);
        assert_eq!(fixed.to_string(), "PT168H/PT24H");

        let calendar = Tier::calendar(CalendarPeriod::years(5), CalendarPeriod::years(1)).unwrap();
        assert_eq!(calendar.kind(), TierKind::Period);
        assert_eq!(calendar.to_string(), "P5Y/P1Y");
    }

    #[test]
    fn test_tier_from_str() {
        let tier: Tier = "P12M/P1M".parse().unwrap();
        assert_eq!(
            tier,
            Tier::calendar(CalendarPeriod::months(12), CalendarPeriod::months(1)).unwrap()
        );

        assert!(matches!("PT48H".parse::<Tier>(), Err(TierError::MissingInput(_))));
    }
}
