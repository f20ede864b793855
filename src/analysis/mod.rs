//! Boundary comparison and policy overlap analysis.
//!
//! Both analyzers are pure functions over already loaded documents and return
//! plain structured results; rendering and exit-code mapping live in
//! [`crate::output`].

pub mod boundary;
pub mod overlap;

pub use boundary::{
    Boundary, Coverage, Finding, SEVERITY_RULES, Severity, SeverityRule, SeveritySummary,
    compare_boundaries, compare_boundaries_with_rules,
};
pub use overlap::{
    OverlapPair, OverlapReport, PairedAction, PolicyActions, find_overlaps, group_by_policy_pair,
};
