//! Consistency checks for IAM-style permission documents.
//!
//! Two analyzers share one data model:
//!
//! - [`analysis::compare_boundaries`] reports actions whose presence differs
//!   across lifecycle permission boundaries, with a severity per finding.
//! - [`analysis::find_overlaps`] reports actions granted by more than one
//!   policy document attached to the same role.
//!
//! Both operate on the literal action strings of already loaded documents.

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod policy;
