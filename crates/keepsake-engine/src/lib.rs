//! Keepsake Engine
//!
//! Retention decisions for versioned data, plus the machinery to apply them.
//!
//! # Overview
//!
//! - [`decide`]: pure function from (versions, policy, current version, now)
//!   to a [`RetentionDecision`](keepsake_domain::RetentionDecision)
//! - [`PolicyConfig`]: TOML/serde form of a policy, with presets
//! - [`Pruner`]: applies a policy to a [`VersionStore`](keepsake_domain::VersionStore)
//! - [`PrunerWorker`]: runs a pruner on a schedule
//!
//! ## Tiers
//!
//! | Window | Bucket | Keeps |
//! |--------|--------|-------|
//! | `PT48H` | `PT1H` | latest version per hour for 48 hours |
//! | `P7D` | `P1D` | latest version per 24h block for 7 days |
//! | `P12M` | `P1M` | latest version per calendar month for 12 months |
//! | `P5Y` | `P1Y` | latest version per calendar year for 5 years |
//!
//! Duration tiers bucket on absolute epoch time. Period tiers bucket on
//! calendar months or years in the policy's bucket zone.
//!
//! # Usage
//!
//! ```
//! use chrono::{TimeDelta, Utc};
//! use keepsake_domain::VersionRef;
//! use keepsake_engine::{decide, PolicyConfig};
//!
//! let policy = PolicyConfig::standard().to_policy().unwrap();
//! let now = Utc::now();
//! let versions: Vec<VersionRef> = (1..=30)
//!     .map(|n| VersionRef::new(n, now - TimeDelta::minutes(30 - n)))
//!     .collect();
//!
//! let decision = decide(&versions, &policy, 30, now).unwrap();
//! assert!(decision.is_kept(30));
//! assert_eq!(decision.keep().len() + decision.delete().len(), 30);
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod metrics;
mod pruner;
mod worker;

pub use config::{PolicyConfig, PrunerConfig, TierSpec};
pub use engine::{decide, decide_now};
pub use error::EngineError;
pub use metrics::PruneMetrics;
pub use pruner::Pruner;
pub use worker::PrunerWorker;
