//! Preset command implementation.

use crate::cli::PresetArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use keepsake_engine::PolicyConfig;

/// Execute the preset command.
pub fn execute_preset(args: PresetArgs, formatter: &Formatter) -> Result<String> {
    let config = PolicyConfig::preset(args.name.as_str())
        .ok_or_else(|| CliError::InvalidInput(format!("unknown preset '{}'", args.name.as_str())))?;
    formatter.format_policy(&config)
}
