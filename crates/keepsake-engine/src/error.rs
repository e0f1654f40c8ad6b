//! Error types for retention engine operations

use chrono::{DateTime, Utc};
use keepsake_domain::{CalendarPeriod, PolicyError};
use thiserror::Error;

/// Errors that can occur while deciding or applying retention
#[derive(Error, Debug)]
pub enum EngineError {
    /// Calendar tier bucket other than one month or one year
    #[error("Calendar bucket currently supports only P1M or P1Y. Got: {0}")]
    UnsupportedCalendarBucket(CalendarPeriod),

    /// Fixed tier bucket shorter than one second
    #[error("Fixed bucket must be >= 1 second. Got: {0}")]
    BucketTooSmall(String),

    /// Subtracting a tier window from "now" leaves the representable range
    #[error("Cutoff for window {window} before {now} is out of range")]
    CutoffOutOfRange {
        /// Window as ISO-8601 text
        window: String,
        /// Evaluation instant
        now: DateTime<Utc>,
    },

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy could not be assembled
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}
