//! Permission boundary comparison.
//!
//! Each boundary is a policy document describing the maximum grant for one
//! lifecycle phase. Actions are compared across boundaries per
//! (normalized action, effect) key, and every key that is not present in all
//! boundaries becomes a [`Finding`] with a severity assigned by
//! [`SEVERITY_RULES`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::policy::{Effect, PolicyDocument, actions_by_effect, normalize_action};

/// Boundary applied while provisioning an install.
pub const PROVISION: &str = "provision";
/// Boundary applied while tearing an install down.
pub const DEPROVISION: &str = "deprovision";
/// Boundary applied for day-two operations.
pub const MAINTENANCE: &str = "maintenance";
/// Boundary applied for emergency access.
pub const BREAKGLASS: &str = "breakglass";

/// A named policy document taking part in the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub name: String,
    pub document: PolicyDocument,
}

impl Boundary {
    pub fn new(name: impl Into<String>, document: PolicyDocument) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (normalized action, effect) key that is not present in every boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// One raw action string as written in a boundary that contains the key.
    #[serde(rename = "action")]
    pub representative_action: String,

    #[serde(rename = "normalized")]
    pub normalized_action: String,

    pub effect: Effect,

    /// Boundaries containing the key, in input order.
    pub present_in: Vec<String>,

    /// Boundaries lacking the key, in input order. Never empty.
    pub missing_from: Vec<String>,

    pub severity: Severity,

    pub note: String,
}

/// Where a key was and was not found, as seen by severity rules.
#[derive(Debug, Clone, Copy)]
pub struct Coverage<'a> {
    pub present_in: &'a [String],
    pub missing_from: &'a [String],
}

impl Coverage<'_> {
    pub fn is_present(&self, boundary: &str) -> bool {
        self.present_in.iter().any(|name| name == boundary)
    }

    pub fn is_missing(&self, boundary: &str) -> bool {
        self.missing_from.iter().any(|name| name == boundary)
    }
}

/// One entry of the ordered severity classification table.
#[derive(Debug, Clone, Copy)]
pub struct SeverityRule {
    pub name: &'static str,
    pub applies: fn(&Coverage<'_>) -> bool,
    pub severity: Severity,
    pub note: &'static str,
}

fn maintenance_only(coverage: &Coverage<'_>) -> bool {
    coverage.is_present(MAINTENANCE)
        && !coverage.is_present(PROVISION)
        && !coverage.is_present(DEPROVISION)
}

fn breakglass_only(coverage: &Coverage<'_>) -> bool {
    coverage.present_in.len() == 1 && coverage.is_present(BREAKGLASS)
}

fn missing_from_lifecycle(coverage: &Coverage<'_>) -> bool {
    coverage.is_missing(PROVISION) || coverage.is_missing(DEPROVISION)
}

fn any_discrepancy(_: &Coverage<'_>) -> bool {
    true
}

/// Severity rules, evaluated in order; the first rule that applies wins.
///
/// The rules only recognize the boundary names [`PROVISION`],
/// [`DEPROVISION`], [`MAINTENANCE`] and [`BREAKGLASS`]. Boundaries under
/// other names can only ever match the medium-severity fallback.
pub const SEVERITY_RULES: &[SeverityRule] = &[
    SeverityRule {
        name: "maintenance-only",
        applies: maintenance_only,
        severity: Severity::High,
        note: "Maintenance allows this but provision/deprovision do not!",
    },
    SeverityRule {
        name: "breakglass-only",
        applies: breakglass_only,
        severity: Severity::Low,
        note: "Breakglass-only (expected for emergency access)",
    },
    SeverityRule {
        name: "missing-from-lifecycle",
        applies: missing_from_lifecycle,
        severity: Severity::Medium,
        note: "Missing from core lifecycle boundaries",
    },
    SeverityRule {
        name: "inconsistent",
        applies: any_discrepancy,
        severity: Severity::Medium,
        note: "",
    },
];

/// Picks the first rule in `rules` that applies to `coverage`.
///
/// Falls back to medium severity with an empty note when no rule applies.
pub fn classify(coverage: &Coverage<'_>, rules: &[SeverityRule]) -> (Severity, &'static str) {
    rules
        .iter()
        .find(|rule| (rule.applies)(coverage))
        .map(|rule| {
            log::trace!("Rule '{}' matched", rule.name);
            (rule.severity, rule.note)
        })
        .unwrap_or((Severity::Medium, ""))
}

/// Compares boundaries using the default [`SEVERITY_RULES`].
///
/// Findings are sorted by (normalized action, effect). An empty input, or
/// boundaries without statements, are valid and simply produce fewer findings.
pub fn compare_boundaries(boundaries: &[Boundary]) -> Vec<Finding> {
    compare_boundaries_with_rules(boundaries, SEVERITY_RULES)
}

/// Compares boundaries, classifying findings with a custom rule table.
pub fn compare_boundaries_with_rules(
    boundaries: &[Boundary],
    rules: &[SeverityRule],
) -> Vec<Finding> {
    let mut names: Vec<&str> = Vec::new();
    for boundary in boundaries {
        if !names.contains(&boundary.name.as_str()) {
            names.push(&boundary.name);
        }
    }

    // (normalized action, effect) -> boundary name -> first raw action seen
    let mut presence: BTreeMap<(String, Effect), BTreeMap<&str, String>> = BTreeMap::new();

    for boundary in boundaries {
        let by_effect = actions_by_effect(&boundary.document.statements);
        log::debug!(
            "Boundary '{}': {} statements, {} effect buckets",
            boundary.name,
            boundary.document.statements.len(),
            by_effect.len()
        );

        for (effect, actions) in by_effect {
            for action in actions {
                let normalized = normalize_action(&action);
                presence
                    .entry((normalized, effect.clone()))
                    .or_default()
                    .entry(boundary.name.as_str())
                    .or_insert(action);
            }
        }
    }

    let mut findings = Vec::new();

    for ((normalized_action, effect), sources) in presence {
        let (present_in, missing_from): (Vec<&str>, Vec<&str>) = names
            .iter()
            .partition(|name| sources.contains_key(*name));

        if missing_from.is_empty() {
            continue;
        }

        // Sources are keyed by name, so the first value belongs to the
        // lexicographically-first boundary containing the key.
        let Some(representative_action) = sources.into_values().next() else {
            continue;
        };

        let present_in: Vec<String> = present_in.into_iter().map(String::from).collect();
        let missing_from: Vec<String> = missing_from.into_iter().map(String::from).collect();

        let (severity, note) = classify(
            &Coverage {
                present_in: &present_in,
                missing_from: &missing_from,
            },
            rules,
        );

        findings.push(Finding {
            representative_action,
            normalized_action,
            effect,
            present_in,
            missing_from,
            severity,
            note: note.to_string(),
        });
    }

    log::debug!(
        "Compared {} boundaries, {} findings",
        names.len(),
        findings.len()
    );

    findings
}

/// Finding counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeveritySummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeveritySummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}
