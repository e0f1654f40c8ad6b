//! Tier command implementation.

use crate::cli::TierArgs;
use crate::error::Result;
use crate::output::Formatter;
use keepsake_domain::parse_tier;

/// Execute the tier command.
pub fn execute_tier(args: TierArgs, formatter: &Formatter) -> Result<String> {
    let tier = parse_tier(&args.window, &args.bucket)?;
    tracing::debug!(%tier, kind = %tier.kind(), "parsed tier");
    formatter.format_tier(&tier)
}
