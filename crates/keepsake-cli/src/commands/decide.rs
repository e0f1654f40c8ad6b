//! Decide command implementation.

use crate::cli::DecideArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::Utc;
use keepsake_domain::{RetentionPolicy, VersionRef};
use keepsake_engine::{decide, PolicyConfig};
use std::io::Read;
use std::path::Path;

/// Execute the decide command.
pub fn execute_decide(args: DecideArgs, formatter: &Formatter) -> Result<String> {
    let policy = load_policy(&args)?;
    let versions = load_versions(&args.versions)?;
    let now = args.now.unwrap_or_else(Utc::now);

    tracing::info!(
        versions = versions.len(),
        current = args.current,
        %now,
        "deciding retention"
    );

    let decision = decide(&versions, &policy, args.current, now)?;
    formatter.format_decision(&versions, &decision)
}

/// Build the policy from `--preset` or the `--policy` file
pub fn load_policy(args: &DecideArgs) -> Result<RetentionPolicy> {
    let config = match (&args.preset, &args.policy) {
        (Some(preset), _) => PolicyConfig::preset(preset.as_str())
            .ok_or_else(|| CliError::InvalidInput(format!("unknown preset '{}'", preset.as_str())))?,
        (None, Some(path)) => PolicyConfig::from_toml_str(&read_input(path)?)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "either --policy or --preset is required".to_string(),
            ))
        }
    };

    Ok(config.to_policy()?)
}

/// Read a JSON array of versions from a file, or stdin for `-`
pub fn load_versions(path: &Path) -> Result<Vec<VersionRef>> {
    let text = read_input(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
