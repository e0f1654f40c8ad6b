//! Output formatting for the CLI.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::*;
use keepsake_domain::{format_duration, RetentionDecision, Tier, VersionRef};
use keepsake_engine::PolicyConfig;
use std::collections::HashMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a retention decision.
    ///
    /// `versions` supplies timestamps for the table view.
    pub fn format_decision(
        &self,
        versions: &[VersionRef],
        decision: &RetentionDecision,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(decision)?),
            OutputFormat::Table => Ok(self.format_decision_table(versions, decision)),
            OutputFormat::Quiet => Ok(decision
                .delete()
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_decision_table(&self, versions: &[VersionRef], decision: &RetentionDecision) -> String {
        if decision.is_empty() {
            return self.colorize("No versions.", "yellow");
        }

        let timestamps: HashMap<i64, String> = versions
            .iter()
            .map(|v| (v.version_number, v.timestamp.to_rfc3339()))
            .collect();

        let mut rows: Vec<(i64, &str)> = decision
            .keep()
            .iter()
            .map(|n| (*n, "keep"))
            .chain(decision.delete().iter().map(|n| (*n, "delete")))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));

        let mut builder = Builder::default();
        builder.push_record(["Version", "Timestamp", "Action"]);
        for (version, action) in rows {
            let timestamp = timestamps.get(&version).map(String::as_str).unwrap_or("-");
            builder.push_record([version.to_string().as_str(), timestamp, action]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let summary = format!(
            "{} kept, {} deletable",
            decision.keep().len(),
            decision.delete().len()
        );
        let color = if decision.delete().is_empty() { "green" } else { "yellow" };

        format!("{}\n{}", table, self.colorize(&summary, color))
    }

    /// Format a parsed tier.
    pub fn format_tier(&self, tier: &Tier) -> Result<String> {
        let (window, bucket, alignment) = match tier {
            Tier::Fixed(t) => (
                format_duration(&t.window()),
                format_duration(&t.bucket()),
                "epoch-aligned".to_string(),
            ),
            Tier::Calendar(t) => {
                let alignment = if t.bucket().is_one_month() {
                    "calendar month in bucket zone".to_string()
                } else if t.bucket().is_one_year() {
                    "calendar year in bucket zone".to_string()
                } else {
                    self.warning("unsupported (only P1M or P1Y)")
                };
                (t.window().to_string(), t.bucket().to_string(), alignment)
            }
        };

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "kind": tier.kind().as_str(),
                "window": window,
                "bucket": bucket,
                "tier": tier.to_string(),
            }))?),
            OutputFormat::Quiet => Ok(tier.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Kind", tier.kind().as_str()]);
                builder.push_record(["Window", window.as_str()]);
                builder.push_record(["Bucket", bucket.as_str()]);
                builder.push_record(["Buckets", alignment.as_str()]);

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a policy configuration.
    ///
    /// JSON when requested, TOML otherwise.
    pub fn format_policy(&self, config: &PolicyConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Table | OutputFormat::Quiet => Ok(toml::to_string(config)?),
        }
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use keepsake_domain::parse_tier;
    use std::collections::BTreeSet;

    fn versions() -> Vec<VersionRef> {
        let base = Utc.with_ymd_and_hms(2025, 12, 25, 0, 0, 0).unwrap();
        (1..=3)
            .map(|n| VersionRef::new(n, base + TimeDelta::hours(n)))
            .collect()
    }

    fn decision() -> RetentionDecision {
        RetentionDecision::new(BTreeSet::from([2, 3]), BTreeSet::from([1]))
    }

    #[test]
    fn test_json_decision() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_decision(&versions(), &decision()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["keep"], serde_json::json!([2, 3]));
        assert_eq!(value["delete"], serde_json::json!([1]));
    }

    #[test]
    fn test_table_decision() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_decision(&versions(), &decision()).unwrap();
        assert!(output.contains("Timestamp"));
        assert!(output.contains("2025-12-25T01:00:00+00:00"));
        assert!(output.contains("delete"));
        assert!(output.ends_with("2 kept, 1 deletable"));
    }

    #[test]
    fn test_table_marks_unlisted_current_version() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let decision = RetentionDecision::new(BTreeSet::from([3, 99]), BTreeSet::from([1, 2]));
        let output = formatter.format_decision(&versions(), &decision).unwrap();
        assert!(output.contains("99"));
        assert!(output.contains(" - "));
    }

    #[test]
    fn test_quiet_decision_lists_deletable() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let decision = RetentionDecision::new(BTreeSet::from([3]), BTreeSet::from([1, 2]));
        let output = formatter.format_decision(&versions(), &decision).unwrap();
        assert_eq!(output, "1\n2");
    }

    #[test]
    fn test_empty_decision() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_decision(&[], &RetentionDecision::empty())
            .unwrap();
        assert_eq!(output, "No versions.");
    }

    #[test]
    fn test_tier_formats() {
        let tier = parse_tier("pt48h", "PT1H").unwrap();

        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_tier(&tier).unwrap(), "PT48H/PT1H");

        let json = Formatter::new(OutputFormat::Json, false);
        let value: serde_json::Value =
            serde_json::from_str(&json.format_tier(&tier).unwrap()).unwrap();
        assert_eq!(value["kind"], "Duration");
        assert_eq!(value["window"], "PT48H");

        let table = Formatter::new(OutputFormat::Table, false);
        let output = table.format_tier(&tier).unwrap();
        assert!(output.contains("epoch-aligned"));
    }

    #[test]
    fn test_unsupported_calendar_bucket_flagged() {
        let tier = parse_tier("P2Y", "P3M").unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_tier(&tier).unwrap();
        assert!(output.contains("unsupported"));
        assert!(output.contains("Period"));
    }

    #[test]
    fn test_policy_as_toml() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_policy(&PolicyConfig::compact()).unwrap();
        assert!(output.contains("keep_last_n = 3"));
        assert!(output.contains("[[tiers]]"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
