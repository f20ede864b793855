//! Report formatter trait and factory.
//!
//! This module defines the `ReportFormatter` trait that all presenters
//! implement, the borrowed report views they render, and a factory that
//! picks the presenter for the selected output mode.

use crate::analysis::{Finding, OverlapReport};
use crate::cli::OutputMode;
use crate::loader::{BoundaryKind, LoadedPolicies, SourceStatus};

use super::OutputError;

/// Boundary comparison results together with how each boundary was loaded.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryReport<'a> {
    pub sources: &'a [(BoundaryKind, SourceStatus)],
    pub findings: &'a [Finding],
}

/// Overlap detection results together with the loaded manifest.
#[derive(Debug, Clone, Copy)]
pub struct OverlapSummary<'a> {
    pub loaded: &'a LoadedPolicies,
    pub overlaps: &'a OverlapReport,
}

/// Trait for rendering analysis results into output strings.
pub trait ReportFormatter {
    fn format_boundaries(&self, report: &BoundaryReport<'_>) -> Result<String, OutputError>;

    fn format_overlaps(&self, summary: &OverlapSummary<'_>) -> Result<String, OutputError>;
}

/// Creates the appropriate formatter for the given output mode.
pub fn create_formatter(mode: OutputMode, no_color: bool) -> Box<dyn ReportFormatter> {
    use super::json::JsonFormatter;
    use super::text::TextFormatter;

    match mode {
        OutputMode::Text => Box::new(TextFormatter { no_color }),
        OutputMode::Json => Box::new(JsonFormatter),
    }
}
