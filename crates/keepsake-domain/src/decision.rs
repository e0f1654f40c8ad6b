//! Decision module - the keep/delete partition produced by the engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keep/delete partition of the version numbers supplied to one evaluation
///
/// `keep` may additionally contain the current version even when it was not
/// part of the input; `delete` only ever contains input version numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionDecision {
    keep: BTreeSet<i64>,
    delete: BTreeSet<i64>,
}

impl RetentionDecision {
    /// Create a decision from its two sets
    pub fn new(keep: BTreeSet<i64>, delete: BTreeSet<i64>) -> Self {
        Self { keep, delete }
    }

    /// An empty decision (no input versions)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Version numbers to retain
    pub fn keep(&self) -> &BTreeSet<i64> {
        &self.keep
    }

    /// Version numbers that may be deleted
    pub fn delete(&self) -> &BTreeSet<i64> {
        &self.delete
    }

    /// Whether `version` is retained
    pub fn is_kept(&self, version: i64) -> bool {
        self.keep.contains(&version)
    }

    /// Whether `version` is deletable
    pub fn is_deletable(&self, version: i64) -> bool {
        self.delete.contains(&version)
    }

    /// Nothing kept and nothing deleted
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty() && self.delete.is_empty()
    }

    /// Consume into `(keep, delete)`
    pub fn into_parts(self) -> (BTreeSet<i64>, BTreeSet<i64>) {
        (self.keep, self.delete)
    }
}
