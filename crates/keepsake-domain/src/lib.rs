//! Keepsake Domain Layer
//!
//! Value types and validation rules for deciding which versions of a
//! versioned dataset (backups, revisions, table versions) to retain.
//! Nothing in this crate performs I/O; the decision function itself lives in
//! `keepsake-engine`.
//!
//! ## Key Concepts
//!
//! - **VersionRef**: a version number plus the instant it was created
//! - **Tier**: a window and a bucket granularity; one version survives per bucket
//!   - Fixed tiers use elapsed time (`PT48H`/`PT1H`, `P7D`/`P1D`)
//!   - Calendar tiers use months and years (`P12M`/`P1M`, `P5Y`/`P1Y`)
//! - **RetentionPolicy**: `keep_last_n`, a list of tiers, and a bucket zone
//! - **RetentionDecision**: the keep/delete partition of the input versions
//!
//! ## Day-only expressions
//!
//! `P7D` could be read as elapsed time or as a calendar span. It is always
//! classified as elapsed time, so `parse_tier("P7D", "P1D")` yields a
//! [`Tier::Fixed`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decision;
pub mod error;
pub mod parse;
pub mod policy;
pub mod tier;
pub mod traits;
pub mod version;

// Re-exports for convenience
pub use decision::RetentionDecision;
pub use error::{PolicyError, TierError};
pub use parse::{classify, parse_duration, parse_period, parse_tier, DurationParseError};
pub use policy::{parse_zone, RetentionPolicy, RetentionPolicyBuilder};
pub use tier::{format_duration, CalendarPeriod, CalendarTier, FixedTier, Tier, TierKind};
pub use traits::VersionStore;
pub use version::VersionRef;
