//! Metrics collection for pruning passes

use keepsake_domain::RetentionDecision;

/// Metrics collected across pruning passes
///
/// Tracks versions kept and deleted, dry runs, and runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneMetrics {
    /// Total pruning passes completed
    pub pass_count: usize,

    /// Passes that only reported what they would delete
    pub dry_run_passes: usize,

    /// Versions retained, summed over all passes
    pub total_kept: usize,

    /// Versions actually deleted, summed over all passes
    pub total_deleted: usize,

    /// Versions a dry run would have deleted, summed over all passes
    pub total_would_delete: usize,

    /// Size of `keep` in the most recent pass
    pub last_kept: usize,

    /// Size of `delete` in the most recent pass
    pub last_deletable: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl PruneMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed pass
    ///
    /// `applied` is false when deletions were skipped (dry run).
    pub fn record_pass(&mut self, decision: &RetentionDecision, applied: bool) {
        let kept = decision.keep().len();
        let deletable = decision.delete().len();

        self.pass_count += 1;
        self.total_kept += kept;
        self.last_kept = kept;
        self.last_deletable = deletable;

        if applied {
            self.total_deleted += deletable;
        } else {
            self.dry_run_passes += 1;
            self.total_would_delete += deletable;
        }
    }

    /// Add elapsed time of a pass
    pub fn record_runtime(&mut self, millis: u64) {
        self.total_runtime_ms = self.total_runtime_ms.saturating_add(millis);
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Prune Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Passes: {}", self.pass_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Versions kept (total): {}", self.total_kept),
            format!("Versions deleted (total): {}", self.total_deleted),
        ];

        if self.dry_run_passes > 0 {
            lines.push(format!("Dry-run passes: {}", self.dry_run_passes));
            lines.push(format!("Would delete (total): {}", self.total_would_delete));
        }

        if self.pass_count > 0 {
            lines.push(String::new());
            lines.push(format!(
                "Last pass: {} kept, {} deletable",
                self.last_kept, self.last_deletable
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn decision(keep: &[i64], delete: &[i64]) -> RetentionDecision {
        RetentionDecision::new(
            keep.iter().copied().collect::<BTreeSet<_>>(),
            delete.iter().copied().collect::<BTreeSet<_>>(),
        )
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = PruneMetrics::new();
        assert_eq!(metrics.pass_count, 0);
        assert_eq!(metrics.total_deleted, 0);
        assert_eq!(metrics.total_kept, 0);
    }

    #[test]
    fn test_record_applied_pass() {
        let mut metrics = PruneMetrics::new();
        metrics.record_pass(&decision(&[3, 4], &[1, 2]), true);
        metrics.record_pass(&decision(&[4], &[3]), true);

        assert_eq!(metrics.pass_count, 2);
        assert_eq!(metrics.total_kept, 3);
        assert_eq!(metrics.total_deleted, 3);
        assert_eq!(metrics.last_kept, 1);
        assert_eq!(metrics.last_deletable, 1);
        assert_eq!(metrics.dry_run_passes, 0);
    }

    #[test]
    fn test_record_dry_run_pass() {
        let mut metrics = PruneMetrics::new();
        metrics.record_pass(&decision(&[3], &[1, 2]), false);

        assert_eq!(metrics.total_deleted, 0);
        assert_eq!(metrics.total_would_delete, 2);
        assert_eq!(metrics.dry_run_passes, 1);
    }

    #[test]
    fn test_reset() {
        let mut metrics = PruneMetrics::new();
        metrics.record_pass(&decision(&[3], &[1, 2]), true);
        metrics.record_runtime(15);

        metrics.reset();

        assert_eq!(metrics, PruneMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = PruneMetrics::new();
        metrics.record_pass(&decision(&[3, 4], &[1, 2]), true);
        metrics.record_pass(&decision(&[4], &[3]), false);
        metrics.total_runtime_ms = 120;

        let summary = metrics.summary();
        assert!(summary.contains("Passes: 2"));
        assert!(summary.contains("Total runtime: 120ms"));
        assert!(summary.contains("Versions deleted (total): 2"));
        assert!(summary.contains("Dry-run passes: 1"));
        assert!(summary.contains("Last pass: 1 kept, 1 deletable"));
    }
}
