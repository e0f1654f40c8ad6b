//! Trait definitions for external interactions
//!
//! Persistence of versions and deletion of discarded ones belong to the caller.
//! These traits only name that boundary so the engine can drive a pruning pass.

use crate::VersionRef;
use std::collections::BTreeSet;

/// A store holding versioned snapshots
///
/// Implemented by whatever owns the versions: a backup directory, a table of
/// revisions, an object-store manifest.
pub trait VersionStore {
    /// Error type for store operations
    type Error;

    /// List every version currently held
    fn list_versions(&self) -> Result<Vec<VersionRef>, Self::Error>;

    /// The version considered active; never deleted
    fn current_version(&self) -> Result<i64, Self::Error>;

    /// Delete the given versions
    fn delete_versions(&mut self, versions: &BTreeSet<i64>) -> Result<(), Self::Error>;
}
