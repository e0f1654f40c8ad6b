//! Error types for tier and policy construction

use crate::parse::DurationParseError;
use crate::tier::TierKind;
use thiserror::Error;

/// Errors raised while constructing or parsing a tier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    /// Window is zero or negative
    #[error("window must be > 0, got {0}")]
    InvalidWindow(String),

    /// Bucket is zero or negative
    #[error("bucket must be > 0, got {0}")]
    InvalidBucket(String),

    /// Window or bucket expression absent
    #[error("Missing tier input: {0}")]
    MissingInput(String),

    /// Window and bucket resolve to different span kinds
    #[error(
        "Mixed tier types. window={window} is {window_kind}, bucket={bucket} is {bucket_kind}. \
         Use both Duration (e.g. P7D/PT48H) or both Period (e.g. P12M/P1Y)."
    )]
    MixedKinds {
        /// Raw window expression
        window: String,
        /// Kind the window resolved to
        window_kind: TierKind,
        /// Raw bucket expression
        bucket: String,
        /// Kind the bucket resolved to
        bucket_kind: TierKind,
    },

    /// Expression does not follow the grammar of its kind
    #[error("Invalid window/bucket format. window={window}, bucket={bucket}: {source}")]
    InvalidFormat {
        /// Raw window expression
        window: String,
        /// Raw bucket expression
        bucket: String,
        /// Underlying grammar failure
        #[source]
        source: DurationParseError,
    },
}

/// Errors raised while assembling a retention policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// keep_last_n below zero
    #[error("keep_last_n must be >= 0, got {0}")]
    NegativeKeepLastN(i64),

    /// Bucket zone is not a known IANA time zone
    #[error("Unknown bucket zone '{zone}': {message}")]
    UnknownZone {
        /// Zone name as given
        zone: String,
        /// Parser message
        message: String,
    },

    /// A tier failed to parse or validate
    #[error("Invalid tier: {0}")]
    Tier(#[from] TierError),
}
