//! Retention decision function
//!
//! Given a list of versions, a policy, the current version and "now", compute
//! which version numbers to keep and which may be deleted:
//!
//! 1. Keep the `keep_last_n` highest version numbers (ordering by version
//!    number, never by timestamp)
//! 2. Keep the current version unconditionally
//! 3. For every tier, keep the latest version of each bucket inside the
//!    tier's window
//! 4. Everything else in the input is deletable
//!
//! The function is pure: no I/O, no clock reads (except [`decide_now`]), no
//! shared state.

use crate::EngineError;
use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use keepsake_domain::{
    format_duration, CalendarPeriod, CalendarTier, FixedTier, RetentionDecision, RetentionPolicy,
    Tier, VersionRef,
};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Decide which versions to keep and which to delete
///
/// An empty `versions` slice yields an empty decision. `current_version` is
/// always in `keep`, even when it is not part of `versions`.
///
/// # Errors
/// - [`EngineError::BucketTooSmall`] for a fixed bucket under one second
/// - [`EngineError::UnsupportedCalendarBucket`] for a calendar bucket other
///   than one month or one year
/// - [`EngineError::CutoffOutOfRange`] if a window reaches past the
///   representable time range
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use keepsake_domain::{RetentionPolicy, VersionRef};
/// use keepsake_engine::decide;
///
/// let base = Utc.with_ymd_and_hms(2025, 12, 25, 0, 0, 0).unwrap();
/// let versions: Vec<VersionRef> = (1..=4)
///     .map(|n| VersionRef::new(n, base + TimeDelta::seconds(n)))
///     .collect();
///
/// let policy = RetentionPolicy::utc(2, vec![]);
/// let decision = decide(&versions, &policy, 4, base + TimeDelta::seconds(10)).unwrap();
///
/// assert!(decision.is_kept(3) && decision.is_kept(4));
/// assert!(decision.is_deletable(1) && decision.is_deletable(2));
/// ```
pub fn decide(
    versions: &[VersionRef],
    policy: &RetentionPolicy,
    current_version: i64,
    now: DateTime<Utc>,
) -> Result<RetentionDecision, EngineError> {
    if versions.is_empty() {
        return Ok(RetentionDecision::empty());
    }

    // Later duplicates overwrite earlier ones
    let by_version: HashMap<i64, &VersionRef> = versions
        .iter()
        .map(|v| (v.version_number, v))
        .collect();

    let all: BTreeSet<i64> = versions.iter().map(|v| v.version_number).collect();

    let mut keep: BTreeSet<i64> = all
        .iter()
        .rev()
        .take(policy.keep_last_n())
        .copied()
        .collect();

    keep.insert(current_version);

    for tier in policy.tiers() {
        let winners = match tier {
            Tier::Fixed(fixed) => keep_latest_per_fixed_bucket(versions, &by_version, fixed, now)?,
            Tier::Calendar(calendar) => keep_latest_per_calendar_bucket(
                versions,
                &by_version,
                calendar,
                policy.bucket_zone(),
                now,
            )?,
        };
        tracing::debug!(tier = %tier, winners = winners.len(), "evaluated tier");
        keep.extend(winners);
    }

    let delete: BTreeSet<i64> = all.difference(&keep).copied().collect();

    tracing::debug!(
        versions = all.len(),
        kept = keep.len(),
        deletable = delete.len(),
        "retention decision computed"
    );

    Ok(RetentionDecision::new(keep, delete))
}

/// [`decide`] evaluated at the current system time
pub fn decide_now(
    versions: &[VersionRef],
    policy: &RetentionPolicy,
    current_version: i64,
) -> Result<RetentionDecision, EngineError> {
    decide(versions, policy, current_version, Utc::now())
}

/// Keep the latest version per fixed bucket within the window
///
/// Buckets are aligned on absolute epoch seconds, so the policy's bucket zone
/// has no effect here.
fn keep_latest_per_fixed_bucket(
    versions: &[VersionRef],
    by_version: &HashMap<i64, &VersionRef>,
    tier: &FixedTier,
    now: DateTime<Utc>,
) -> Result<BTreeSet<i64>, EngineError> {
    let bucket_secs = tier.bucket().num_seconds();
    if bucket_secs < 1 {
        return Err(EngineError::BucketTooSmall(format_duration(&tier.bucket())));
    }

    let cutoff = now
        .checked_sub_signed(tier.window())
        .ok_or_else(|| EngineError::CutoffOutOfRange {
            window: format_duration(&tier.window()),
            now,
        })?;

    let candidates = versions
        .iter()
        .filter(|v| v.timestamp >= cutoff)
        .map(|v| (fixed_bucket_key(&v.timestamp, bucket_secs), v));

    Ok(latest_per_bucket(candidates, by_version))
}

/// Start of the bucket containing `t`, in epoch seconds
fn fixed_bucket_key(t: &DateTime<Utc>, bucket_secs: i64) -> i64 {
    t.timestamp().div_euclid(bucket_secs) * bucket_secs
}

/// Calendar bucket identity in the bucket zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CalendarKey {
    Month(i32, u32),
    Year(i32),
}

/// Supported calendar bucket granularities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarGranularity {
    Month,
    Year,
}

impl CalendarGranularity {
    fn of(bucket: CalendarPeriod) -> Result<Self, EngineError> {
        if bucket.is_one_month() {
            Ok(Self::Month)
        } else if bucket.is_one_year() {
            Ok(Self::Year)
        } else {
            Err(EngineError::UnsupportedCalendarBucket(bucket))
        }
    }

    fn key(&self, t: &DateTime<Tz>) -> CalendarKey {
        match self {
            Self::Month => CalendarKey::Month(t.year(), t.month()),
            Self::Year => CalendarKey::Year(t.year()),
        }
    }
}

/// Keep the latest version per calendar month or year within the window
fn keep_latest_per_calendar_bucket(
    versions: &[VersionRef],
    by_version: &HashMap<i64, &VersionRef>,
    tier: &CalendarTier,
    zone: Tz,
    now: DateTime<Utc>,
) -> Result<BTreeSet<i64>, EngineError> {
    let granularity = CalendarGranularity::of(tier.bucket())?;
    let cutoff = calendar_cutoff(now, tier.window(), zone)?;

    let candidates = versions.iter().filter_map(|v| {
        let zoned = v.timestamp.with_timezone(&zone);
        (zoned >= cutoff).then(|| (granularity.key(&zoned), v))
    });

    Ok(latest_per_bucket(candidates, by_version))
}

/// Zoned "now" minus a calendar window
///
/// Months (years folded in) are subtracted first, clamping the day of month,
/// then days. The arithmetic runs on local wall-clock time.
pub(crate) fn calendar_cutoff(
    now: DateTime<Utc>,
    window: CalendarPeriod,
    zone: Tz,
) -> Result<DateTime<Tz>, EngineError> {
    let out_of_range = || EngineError::CutoffOutOfRange {
        window: window.to_string(),
        now,
    };

    let local = now.with_timezone(&zone).naive_local();
    let months = u32::try_from(window.total_months()).map_err(|_| out_of_range())?;
    let days = u64::try_from(window.days).map_err(|_| out_of_range())?;

    let shifted = local
        .checked_sub_months(Months::new(months))
        .and_then(|t| t.checked_sub_days(Days::new(days)))
        .ok_or_else(out_of_range)?;

    resolve_local(zone, shifted).ok_or_else(out_of_range)
}

/// Map a local wall-clock time to an instant in `zone`
///
/// Ambiguous times (clocks turned back) take the earlier offset. Times inside
/// a gap (clocks turned forward) move forward by the length of the gap.
fn resolve_local(zone: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(a, b) => Some(a.min(b)),
        LocalResult::None => {
            let probe = local.checked_sub_signed(TimeDelta::days(1))?;
            let before = zone.offset_from_utc_datetime(&probe).fix();
            let utc =
                local.checked_sub_signed(TimeDelta::seconds(i64::from(before.local_minus_utc())))?;
            Some(zone.from_utc_datetime(&utc))
        }
    }
}

/// One winner per bucket: latest timestamp, then highest version number
fn latest_per_bucket<'a, K, I>(
    candidates: I,
    by_version: &HashMap<i64, &'a VersionRef>,
) -> BTreeSet<i64>
where
    K: Eq + Hash,
    I: Iterator<Item = (K, &'a VersionRef)>,
{
    let mut best: HashMap<K, i64> = HashMap::new();

    for (key, candidate) in candidates {
        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(candidate.version_number);
            }
            Entry::Occupied(mut slot) => {
                let current = by_version.get(slot.get()).copied();
                if current.map_or(true, |c| candidate.supersedes(c)) {
                    slot.insert(candidate.version_number);
                }
            }
        }
    }

    best.into_values().collect()
}
