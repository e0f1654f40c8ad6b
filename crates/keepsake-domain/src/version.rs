//! Version module - the snapshots a retention decision ranges over

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one retainable snapshot (backup, revision, table version)
///
/// Version numbers are expected to be unique and monotonically increasing
/// within one decision call; "keep last N" ranks by them, not by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    /// Monotonic version identifier (revision, sequence, id)
    pub version_number: i64,

    /// When the version was created or edited
    pub timestamp: DateTime<Utc>,
}

impl VersionRef {
    /// Create a new version reference
    pub fn new(version_number: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            version_number,
            timestamp,
        }
    }

    /// Whether this version beats `other` as a bucket winner
    ///
    /// The later timestamp wins; on identical timestamps the higher version
    /// number wins.
    pub fn supersedes(&self, other: &VersionRef) -> bool {
        match self.timestamp.cmp(&other.timestamp) {
            std::cmp::Ordering::Equal => self.version_number > other.version_number,
            ordering => ordering.is_gt(),
        }
    }
}
