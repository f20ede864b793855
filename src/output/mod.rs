//! Output generation for analysis results.
//!
//! This module renders boundary findings and policy overlaps through a
//! selectable presenter (text tables or JSON) and maps results to process exit
//! codes. The analyzers never depend on anything here.

pub mod formatter;
pub mod json;
pub mod text;

use std::io::{self, Write};

use thiserror::Error;

use crate::analysis::{Finding, OverlapReport, Severity};
use crate::cli::OutputMode;
use crate::loader::{LoadedBoundaries, LoadedPolicies};
use formatter::{BoundaryReport, OverlapSummary, ReportFormatter, create_formatter};

/// Exit code for a clean run.
pub const EXIT_OK: u8 = 0;

/// Exit code when a high-severity finding or an overlap was reported.
pub const EXIT_FINDINGS: u8 = 1;

/// Errors that can occur during output generation.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error")]
    Fmt(#[from] std::fmt::Error),
}

/// Exit code for a boundary comparison: only high-severity findings fail.
pub fn exit_code_for_boundaries(findings: &[Finding]) -> u8 {
    if findings.iter().any(|f| f.severity == Severity::High) {
        EXIT_FINDINGS
    } else {
        EXIT_OK
    }
}

/// Exit code for overlap detection: any overlap fails.
pub fn exit_code_for_overlaps(overlaps: &OverlapReport) -> u8 {
    if overlaps.is_empty() {
        EXIT_OK
    } else {
        EXIT_FINDINGS
    }
}

/// Writes analysis reports to stdout.
pub struct ReportWriter {
    formatter: Box<dyn ReportFormatter>,
}

impl ReportWriter {
    /// Creates a new writer.
    ///
    /// # Arguments
    ///
    /// * `mode` - The output mode to render with
    /// * `no_color` - Whether to disable colored output
    pub fn new(mode: OutputMode, no_color: bool) -> Self {
        Self {
            formatter: create_formatter(mode, no_color),
        }
    }

    /// Renders a boundary comparison without writing it.
    pub fn render_boundaries(
        &self,
        loaded: &LoadedBoundaries,
        findings: &[Finding],
    ) -> Result<String, OutputError> {
        self.formatter.format_boundaries(&BoundaryReport {
            sources: &loaded.sources,
            findings,
        })
    }

    /// Renders an overlap report without writing it.
    pub fn render_overlaps(
        &self,
        loaded: &LoadedPolicies,
        overlaps: &OverlapReport,
    ) -> Result<String, OutputError> {
        self.formatter
            .format_overlaps(&OverlapSummary { loaded, overlaps })
    }

    pub fn write_boundaries(
        &self,
        loaded: &LoadedBoundaries,
        findings: &[Finding],
    ) -> Result<(), OutputError> {
        let rendered = self.render_boundaries(loaded, findings)?;
        Self::write_to_stdout(&rendered)
    }

    pub fn write_overlaps(
        &self,
        loaded: &LoadedPolicies,
        overlaps: &OverlapReport,
    ) -> Result<(), OutputError> {
        let rendered = self.render_overlaps(loaded, overlaps)?;
        Self::write_to_stdout(&rendered)
    }

    fn write_to_stdout(rendered: &str) -> Result<(), OutputError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();

        if rendered.ends_with('\n') {
            write!(handle, "{}", rendered)?;
        } else {
            writeln!(handle, "{}", rendered)?;
        }
        handle.flush()?;

        Ok(())
    }
}
