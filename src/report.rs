/*!
 * Reporting functionality for lmpack
 *
 * Summarizes a packing run either as a console table rendered with the
 * tabled library or as JSON.
 */

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use strum::Display;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::classifier::CounterSnapshot;
use crate::error::Result;
use crate::utils::format_file_size;

/// Statistics for a packing run
#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Size of the written document in bytes
    pub output_bytes: u64,
    /// File counters
    pub counters: CounterSnapshot,
}

/// Format of the report output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    /// Console table output
    #[default]
    Table,
    /// Machine readable JSON
    Json,
}

/// Report generator for pack results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &PackReport) -> Result<String> {
        match self.format {
            ReportFormat::Table => Ok(self.generate_console_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &PackReport) -> Result<()> {
        println!("\n{}", self.generate_report(report)?);
        Ok(())
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &PackReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let counters = &report.counters;
        let row = |key: &str, value: String| SummaryRow {
            key: key.to_string(),
            value,
        };

        let rows = vec![
            row("📂 Output File", report.output_file.clone()),
            row("⏱️ Process Time", format!("{:.4?}", report.duration)),
            row("📦 Output Size", format_file_size(report.output_bytes)),
            row(
                "🚫 Ignored (default rules)",
                counters.excluded_default.to_string(),
            ),
            row(
                "🚫 Ignored (include patterns)",
                counters.excluded_include_filter.to_string(),
            ),
            row(
                "📄 Included without content",
                counters.included_no_content.to_string(),
            ),
            row("🧱 Binary files", counters.included_binary.to_string()),
            row("⚠️ Read errors", counters.read_errors.to_string()),
            row(
                "✅ Total files included",
                format!("{}/{}", counters.included, counters.processed),
            ),
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &PackReport) -> String {
        format!("✅  CONTEXT WRITTEN\n{}", self.create_summary_table(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackReport {
        PackReport {
            output_file: "/tmp/repo_context.lmpack.md".to_string(),
            duration: Duration::from_millis(12),
            output_bytes: 2048,
            counters: CounterSnapshot {
                processed: 3,
                excluded_default: 1,
                included: 2,
                included_no_content: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_console_report() {
        let text = Reporter::new(ReportFormat::Table)
            .generate_report(&sample())
            .unwrap();

        assert!(text.contains("repo_context.lmpack.md"));
        assert!(text.contains("2/3"));
        assert!(text.contains("2.00 KB"));
    }

    #[test]
    fn test_json_report() {
        let text = Reporter::new(ReportFormat::Json)
            .generate_report(&sample())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["counters"]["processed"], 3);
        assert_eq!(value["counters"]["included_no_content"], 1);
        assert_eq!(value["output_bytes"], 2048);
    }

    #[test]
    fn test_report_format_names() {
        assert_eq!(ReportFormat::Json.to_string(), "json");
        assert_eq!(ReportFormat::default(), ReportFormat::Table);
    }
}
