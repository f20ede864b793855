//! Human-readable output formatter.
//!
//! Renders boundary findings as one table per severity and overlaps as one
//! table per policy pair, each followed by a short summary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use regex::Regex;

use crate::analysis::{Finding, Severity, SeveritySummary, group_by_policy_pair};
use crate::loader::SourceStatus;

use super::OutputError;
use super::formatter::{BoundaryReport, OverlapSummary, ReportFormatter};

/// Matches templated install references such as `{{.nuon.install.id}}`.
static TEMPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.nuon\.([A-Za-z0-9_]+)(?:\.[A-Za-z0-9_]+)*\s*\}\}").expect("valid regex")
});

/// Replaces template placeholders in a policy name with `<scope>` markers.
///
/// Display only; the placeholder is not resolved.
pub fn display_name(name: &str) -> String {
    TEMPLATE_PATTERN.replace_all(name, "<$1>").into_owned()
}

/// Formatter producing tables for terminals.
pub struct TextFormatter {
    /// Whether to disable colored output.
    pub no_color: bool,
}

impl TextFormatter {
    fn heading(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.cyan().bold().to_string()
        }
    }

    fn table(&self, header: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let header_cells: Vec<Cell> = header
            .iter()
            .map(|title| {
                if self.no_color {
                    Cell::new(title)
                } else {
                    Cell::new(title).add_attribute(Attribute::Bold)
                }
            })
            .collect();
        table.set_header(header_cells);
        table
    }

    fn cell(&self, content: &str, color: Color) -> Cell {
        if self.no_color {
            Cell::new(content)
        } else {
            Cell::new(content).fg(color)
        }
    }

    fn severity_label(&self, severity: Severity, text: String) -> String {
        if self.no_color {
            return text;
        }
        match severity {
            Severity::High => text.red().bold().to_string(),
            Severity::Medium => text.yellow().bold().to_string(),
            Severity::Low => text.blue().bold().to_string(),
        }
    }

    fn findings_table(&self, findings: &[&Finding]) -> Table {
        let mut table = self.table(&["Action", "Effect", "Present In", "Missing From", "Note"]);
        for finding in findings {
            table.add_row(vec![
                self.cell(&finding.representative_action, Color::Cyan),
                self.cell(finding.effect.as_str(), Color::Green),
                self.cell(&finding.present_in.join(", "), Color::Green),
                self.cell(&finding.missing_from.join(", "), Color::Red),
                self.cell(&finding.note, Color::DarkGrey),
            ]);
        }
        table
    }

    fn write_load_status(
        &self,
        out: &mut String,
        name: &str,
        status: &SourceStatus,
    ) -> std::fmt::Result {
        match status {
            SourceStatus::Loaded(path) => {
                let file = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let mark = if self.no_color {
                    "✓".to_string()
                } else {
                    "✓".green().to_string()
                };
                writeln!(out, "  {} Loaded {}: {}", mark, name, file)
            }
            SourceStatus::Missing(path) => {
                let mark = if self.no_color {
                    "✗".to_string()
                } else {
                    "✗".red().to_string()
                };
                writeln!(out, "  {} Missing {}: {}", mark, name, path.display())
            }
            SourceStatus::Invalid { path, reason } => {
                let mark = if self.no_color {
                    "!".to_string()
                } else {
                    "!".yellow().to_string()
                };
                writeln!(
                    out,
                    "  {} Invalid {}: {} ({})",
                    mark,
                    name,
                    path.display(),
                    reason
                )
            }
        }
    }
}

impl ReportFormatter for TextFormatter {
    fn format_boundaries(&self, report: &BoundaryReport<'_>) -> Result<String, OutputError> {
        let mut out = String::new();

        writeln!(out, "{}", self.heading("Loading Permission Boundaries"))?;
        for (kind, status) in report.sources {
            self.write_load_status(&mut out, kind.name(), status)?;
        }
        writeln!(out)?;

        if report.findings.is_empty() {
            let message = "All boundaries are consistent!";
            if self.no_color {
                writeln!(out, "{}", message)?;
            } else {
                writeln!(out, "{}", message.green().bold())?;
            }
            return Ok(out);
        }

        let mut by_severity: BTreeMap<Severity, Vec<&Finding>> = BTreeMap::new();
        for finding in report.findings {
            by_severity.entry(finding.severity).or_default().push(finding);
        }

        for severity in Severity::ALL {
            let Some(items) = by_severity.get(&severity) else {
                continue;
            };
            let title = format!(
                "{} PRIORITY ({} findings)",
                severity.as_str().to_uppercase(),
                items.len()
            );
            writeln!(out, "{}", self.severity_label(severity, title))?;
            writeln!(out, "{}", self.findings_table(items))?;
            writeln!(out)?;
        }

        let summary = SeveritySummary::from_findings(report.findings);
        writeln!(out, "{}", self.heading("Summary"))?;
        writeln!(out, "Total discrepancies: {}", summary.total())?;
        writeln!(
            out,
            "  High: {}  Medium: {}  Low: {}",
            summary.high, summary.medium, summary.low
        )?;

        Ok(out)
    }

    fn format_overlaps(&self, summary: &OverlapSummary<'_>) -> Result<String, OutputError> {
        let mut out = String::new();
        let loaded = summary.loaded;

        if let Some(problem) = &loaded.manifest_problem {
            let message = format!(
                "Could not read manifest {}: {}",
                loaded.manifest.display(),
                problem
            );
            if self.no_color {
                writeln!(out, "{}", message)?;
            } else {
                writeln!(out, "{}", message.yellow())?;
            }
            return Ok(out);
        }

        if loaded.is_empty_manifest() {
            let message = "No [[policies]] blocks found in the manifest.";
            if self.no_color {
                writeln!(out, "{}", message)?;
            } else {
                writeln!(out, "{}", message.yellow())?;
            }
            return Ok(out);
        }

        writeln!(
            out,
            "{} {}",
            self.heading("Analyzing"),
            loaded.manifest.display()
        )?;

        for source in &loaded.sources {
            if !source.status.is_loaded() {
                self.write_load_status(&mut out, &display_name(&source.name), &source.status)?;
            }
        }

        let mut documents = self.table(&["Policy Name", "File", "Statements", "Actions"]);
        for source in loaded.sources.iter().filter(|s| s.status.is_loaded()) {
            documents.add_row(vec![
                self.cell(&display_name(&source.name), Color::Cyan),
                self.cell(&source.document_id, Color::Green),
                Cell::new(source.statements).set_alignment(CellAlignment::Right),
                Cell::new(source.actions).set_alignment(CellAlignment::Right),
            ]);
        }
        writeln!(out, "{}", self.heading("Policy Documents"))?;
        writeln!(out, "{}", documents)?;
        writeln!(out)?;

        if summary.overlaps.is_empty() {
            let message = "No overlapping actions found between policies.";
            if self.no_color {
                writeln!(out, "{}", message)?;
            } else {
                writeln!(out, "{}", message.green().bold())?;
            }
            return Ok(out);
        }

        let found = format!("Found {} overlapping action(s)", summary.overlaps.len());
        if self.no_color {
            writeln!(out, "{}", found)?;
        } else {
            writeln!(out, "{}", found.yellow().bold())?;
        }
        writeln!(out)?;

        let by_pair = group_by_policy_pair(summary.overlaps);
        for ((first, second), actions) in &by_pair {
            let sid_first = format!("Sid in {}", first);
            let sid_second = format!("Sid in {}", second);
            let mut table = self.table(&["Action", &sid_first, &sid_second]);
            for paired in actions {
                table.add_row(vec![
                    self.cell(&paired.action, Color::Red),
                    self.cell(&paired.sid_first, Color::Cyan),
                    self.cell(&paired.sid_second, Color::Cyan),
                ]);
            }
            writeln!(out, "{}", self.heading(&format!("{} <-> {}", first, second)))?;
            writeln!(out, "{}", table)?;
            writeln!(out)?;
        }

        writeln!(out, "{}", self.heading("Summary"))?;
        writeln!(out, "Total overlapping actions: {}", summary.overlaps.len())?;
        writeln!(out, "Policy pairs with overlaps: {}", by_pair.len())?;

        Ok(out)
    }
}
