//! JSON output formatter.
//!
//! Emits the structured results only, without load summaries or decoration,
//! so the output can be consumed by other tools:
//!
//! - boundaries: an array of findings
//! - overlaps: an object mapping each action to its cross-document pairs

use super::OutputError;
use super::formatter::{BoundaryReport, OverlapSummary, ReportFormatter};

pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_boundaries(&self, report: &BoundaryReport<'_>) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(report.findings)?)
    }

    fn format_overlaps(&self, summary: &OverlapSummary<'_>) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(summary.overlaps)?)
    }
}
