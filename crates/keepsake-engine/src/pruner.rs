//! Pruning pass: decide over a store's versions and delete the rest

use crate::{decide, EngineError, PruneMetrics, PrunerConfig};
use chrono::{DateTime, Utc};
use keepsake_domain::{RetentionDecision, RetentionPolicy, VersionStore};
use std::time::Instant;

/// Applies a retention policy to a [`VersionStore`]
///
/// Each pass:
/// 1. Lists the store's versions and its current version
/// 2. Runs [`decide`] against the policy
/// 3. Deletes the deletable versions (skipped in dry-run mode)
/// 4. Records metrics
///
/// # Examples
///
/// ```
/// use keepsake_domain::{RetentionPolicy, VersionRef, VersionStore};
/// use keepsake_engine::Pruner;
/// use chrono::{TimeDelta, Utc};
/// use std::collections::BTreeSet;
///
/// struct Snapshots(Vec<VersionRef>);
///
/// impl VersionStore for Snapshots {
///     type Error = String;
///
///     fn list_versions(&self) -> Result<Vec<VersionRef>, String> {
///         Ok(self.0.clone())
///     }
///
///     fn current_version(&self) -> Result<i64, String> {
///         self.0.iter().map(|v| v.version_number).max().ok_or("empty".into())
///     }
///
///     fn delete_versions(&mut self, versions: &BTreeSet<i64>) -> Result<(), String> {
///         self.0.retain(|v| !versions.contains(&v.version_number));
///         Ok(())
///     }
/// }
///
/// let now = Utc::now();
/// let mut store = Snapshots(
///     (1..=5).map(|n| VersionRef::new(n, now - TimeDelta::hours(6 - n))).collect(),
/// );
///
/// let mut pruner = Pruner::new(RetentionPolicy::utc(2, vec![]), false);
/// let decision = pruner.prune(&mut store).unwrap();
///
/// assert_eq!(decision.delete().len(), 3);
/// assert_eq!(store.0.len(), 2);
/// ```
#[derive(Debug)]
pub struct Pruner {
    policy: RetentionPolicy,
    dry_run: bool,
    metrics: PruneMetrics,
}

impl Pruner {
    /// Create a pruner for `policy`
    pub fn new(policy: RetentionPolicy, dry_run: bool) -> Self {
        Self {
            policy,
            dry_run,
            metrics: PruneMetrics::new(),
        }
    }

    /// Create a pruner from configuration
    ///
    /// # Errors
    /// Returns an error if the configured policy is invalid
    pub fn from_config(config: &PrunerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::new(config.policy.to_policy()?, config.dry_run))
    }

    /// Policy applied by this pruner
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Whether deletions are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &PruneMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Run one pass at the current system time
    pub fn prune<S>(&mut self, store: &mut S) -> Result<RetentionDecision, EngineError>
    where
        S: VersionStore,
        S::Error: std::fmt::Display,
    {
        self.prune_at(store, Utc::now())
    }

    /// Run one pass evaluated at `now`
    ///
    /// Returns the decision. Nothing is deleted if the decision cannot be
    /// computed.
    pub fn prune_at<S>(
        &mut self,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> Result<RetentionDecision, EngineError>
    where
        S: VersionStore,
        S::Error: std::fmt::Display,
    {
        let start = Instant::now();

        let versions = store
            .list_versions()
            .map_err(|e| EngineError::Store(e.to_string()))?;
        let current = store
            .current_version()
            .map_err(|e| EngineError::Store(e.to_string()))?;

        let decision = decide(&versions, &self.policy, current, now)?;
        let deletable = decision.delete();

        let applied = if deletable.is_empty() {
            tracing::debug!(versions = versions.len(), "nothing to prune");
            true
        } else if self.dry_run {
            tracing::info!(
                "DRY RUN: Would delete {} of {} versions: {:?}",
                deletable.len(),
                versions.len(),
                deletable
            );
            false
        } else {
            store
                .delete_versions(deletable)
                .map_err(|e| EngineError::Store(e.to_string()))?;
            tracing::info!(
                "Deleted {} of {} versions (current version {})",
                deletable.len(),
                versions.len(),
                current
            );
            true
        };

        self.metrics.record_pass(&decision, applied);
        self.metrics
            .record_runtime(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX));

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PolicyConfig, TierSpec};
    use chrono::{TimeDelta, TimeZone};
    use keepsake_domain::VersionRef;
    use std::collections::BTreeSet;

    // Mock store for testing
    struct MockStore {
        versions: Vec<VersionRef>,
        current: i64,
        deleted: Vec<i64>,
        fail_deletes: bool,
    }

    impl MockStore {
        fn new(current: i64) -> Self {
            Self {
                versions: Vec::new(),
                current,
                deleted: Vec::new(),
                fail_deletes: false,
            }
        }

        fn add_version(&mut self, n: i64, at: DateTime<Utc>) {
            self.versions.push(VersionRef::new(n, at));
        }
    }

    impl VersionStore for MockStore {
        type Error = String;

        fn list_versions(&self) -> Result<Vec<VersionRef>, Self::Error> {
            Ok(self.versions.clone())
        }

        fn current_version(&self) -> Result<i64, Self::Error> {
            Ok(self.current)
        }

        fn delete_versions(&mut self, versions: &BTreeSet<i64>) -> Result<(), Self::Error> {
            if self.fail_deletes {
                return Err("disk is read-only".to_string());
            }
            self.versions.retain(|v| !versions.contains(&v.version_number));
            self.deleted.extend(versions.iter().copied());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 25, 12, 0, 0).unwrap()
    }

    fn store_with_hourly_versions(count: i64) -> MockStore {
        let mut store = MockStore::new(count);
        for n in 1..=count {
            store.add_version(n, now() - TimeDelta::hours(count - n));
        }
        store
    }

    #[test]
    fn test_pruner_creation() {
        let pruner = Pruner::new(RetentionPolicy::default(), true);
        assert!(pruner.is_dry_run());
        assert_eq!(pruner.metrics().pass_count, 0);
    }

    #[test]
    fn test_prune_deletes_unkept_versions() {
        let mut store = store_with_hourly_versions(6);
        let mut pruner = Pruner::new(RetentionPolicy::utc(2, vec![]), false);

        let decision = pruner.prune_at(&mut store, now()).unwrap();

        assert_eq!(decision.delete().len(), 4);
        assert_eq!(store.deleted, vec![1, 2, 3, 4]);
        assert_eq!(store.versions.len(), 2);
        assert_eq!(pruner.metrics().total_deleted, 4);
    }

    #[test]
    fn test_prune_respects_dry_run() {
        let mut store = store_with_hourly_versions(6);
        let mut pruner = Pruner::new(RetentionPolicy::utc(2, vec![]), true);

        let decision = pruner.prune_at(&mut store, now()).unwrap();

        assert_eq!(decision.delete().len(), 4);
        assert!(store.deleted.is_empty());
        assert_eq!(store.versions.len(), 6);
        assert_eq!(pruner.metrics().total_deleted, 0);
        assert_eq!(pruner.metrics().total_would_delete, 4);
    }

    #[test]
    fn test_prune_never_deletes_current_version() {
        let mut store = store_with_hourly_versions(4);
        store.current = 1;
        let mut pruner = Pruner::new(RetentionPolicy::default(), false);

        pruner.prune_at(&mut store, now()).unwrap();

        assert_eq!(store.versions.len(), 1);
        assert_eq!(store.versions[0].version_number, 1);
    }

    #[test]
    fn test_prune_surfaces_store_errors() {
        let mut store = store_with_hourly_versions(4);
        store.fail_deletes = true;
        let mut pruner = Pruner::new(RetentionPolicy::default(), false);

        let err = pruner.prune_at(&mut store, now()).unwrap_err();
        assert!(matches!(err, EngineError::Store(msg) if msg.contains("read-only")));
        assert_eq!(pruner.metrics().pass_count, 0);
    }

    #[test]
    fn test_invalid_tier_deletes_nothing() {
        let mut store = store_with_hourly_versions(4);
        let policy = RetentionPolicy::utc(
            0,
            vec![keepsake_domain::parse_tier("P2Y", "P3M").unwrap()],
        );
        let mut pruner = Pruner::new(policy, false);

        assert!(matches!(
            pruner.prune_at(&mut store, now()),
            Err(EngineError::UnsupportedCalendarBucket(_))
        ));
        assert!(store.deleted.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = PrunerConfig {
            policy: PolicyConfig {
                keep_last_n: 1,
                tiers: vec![TierSpec::new("PT3H", "PT1H")],
                ..Default::default()
            },
            dry_run: false,
            ..Default::default()
        };
        let mut pruner = Pruner::from_config(&config).unwrap();
        let mut store = store_with_hourly_versions(6);

        let decision = pruner.prune_at(&mut store, now()).unwrap();

        // Versions 3..=6 fall inside the 3 hour window, one per hour
        assert_eq!(decision.keep(), &(3..=6).collect::<BTreeSet<i64>>());
        assert_eq!(store.deleted, vec![1, 2]);
    }

    #[test]
    fn test_metrics_reset() {
        let mut store = store_with_hourly_versions(3);
        let mut pruner = Pruner::new(RetentionPolicy::default(), false);

        pruner.prune_at(&mut store, now()).unwrap();
        assert_eq!(pruner.metrics().pass_count, 1);

        pruner.reset_metrics();
        assert_eq!(pruner.metrics().pass_count, 0);
    }
}
