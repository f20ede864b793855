//! Command drivers: load, analyze, render, and pick the exit code.

use std::path::Path;

use crate::analysis::{compare_boundaries, find_overlaps};
use crate::error::Result;
use crate::loader::{LoadContext, load_boundaries, load_manifest_policies};
use crate::output::{ReportWriter, exit_code_for_boundaries, exit_code_for_overlaps};

/// Runs `check-boundaries` and returns the process exit code.
pub fn check_boundaries(ctx: &LoadContext, writer: &ReportWriter) -> Result<u8> {
    let loaded = load_boundaries(ctx)?;

    log::debug!(
        "Loaded {} of {} boundaries",
        loaded.boundaries.len(),
        loaded.sources.len()
    );

    let findings = compare_boundaries(&loaded.boundaries);
    writer.write_boundaries(&loaded, &findings)?;

    Ok(exit_code_for_boundaries(&findings))
}

/// Runs `check-overlap` for the given manifest and returns the process exit
/// code.
pub fn check_overlap(ctx: &LoadContext, manifest: &Path, writer: &ReportWriter) -> Result<u8> {
    let manifest_path = ctx.resolve_manifest(manifest)?;
    let loaded = load_manifest_policies(&manifest_path)?;

    log::debug!(
        "Loaded {} of {} policies from {:?}",
        loaded.policies.len(),
        loaded.sources.len(),
        manifest_path
    );

    let overlaps = find_overlaps(&loaded.policies);
    writer.write_overlaps(&loaded, &overlaps)?;

    Ok(exit_code_for_overlaps(&overlaps))
}
