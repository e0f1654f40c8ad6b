//! CLI command definitions and argument parsing.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keepsake CLI - Decide which versions a retention policy keeps.
#[derive(Debug, Parser)]
#[command(name = "keepsake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output (any non-empty NO_COLOR other than 0/false/no/off)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (deletable version numbers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decide which versions to keep and which to delete
    Decide(DecideArgs),

    /// Parse and classify a tier definition
    Tier(TierArgs),

    /// Print a built-in policy as TOML
    Preset(PresetArgs),
}

/// Arguments for the decide command.
#[derive(Debug, Parser)]
pub struct DecideArgs {
    /// Policy file (TOML)
    #[arg(
        short,
        long,
        conflicts_with = "preset",
        required_unless_present = "preset"
    )]
    pub policy: Option<PathBuf>,

    /// Use a built-in policy instead of a file
    #[arg(long, value_enum)]
    pub preset: Option<PresetName>,

    /// Versions file (JSON array of {"version_number", "timestamp"}), or - for stdin
    #[arg(short = 'i', long)]
    pub versions: PathBuf,

    /// Version currently in use; never deleted
    #[arg(short, long, allow_negative_numbers = true)]
    pub current: i64,

    /// Evaluation instant (RFC 3339), defaults to the system clock
    #[arg(short, long)]
    pub now: Option<DateTime<Utc>>,
}

/// Arguments for the tier command.
#[derive(Debug, Parser)]
pub struct TierArgs {
    /// Window, e.g. PT48H or P12M
    pub window: String,

    /// Bucket, e.g. PT1H or P1M
    pub bucket: String,
}

/// Arguments for the preset command.
#[derive(Debug, Parser)]
pub struct PresetArgs {
    /// Preset name
    #[arg(value_enum)]
    pub name: PresetName,
}

/// Built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetName {
    /// Last 10, hourly for 48h, daily for 7d, monthly for 12m, yearly for 5y
    Standard,
    /// Last 3, hourly for 24h, daily for 14d, monthly for 6m
    Compact,
}

impl PresetName {
    /// Name understood by `PolicyConfig::preset`
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Standard => "standard",
            PresetName::Compact => "compact",
        }
    }
}
