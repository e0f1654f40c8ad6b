//! Error types for the CLI application.

use keepsake_domain::{PolicyError, TierError};
use keepsake_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Policy could not be built
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Tier could not be parsed
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Input file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML rendering error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
