use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Permission boundary and policy overlap checker
///
/// Compares the permission boundaries of an app's lifecycle phases
/// (provision, deprovision, maintenance, breakglass) and detects IAM actions
/// granted by more than one policy document of a role.
///
/// DISCLAIMER: The analysis works on the literal action strings in the
/// documents. Wildcards are not expanded and resources and conditions are not
/// evaluated, so findings are a starting point for least-privilege review.
#[derive(Parser, Debug)]
#[command(name = "permcheck")]
#[command(version)]
#[command(about, long_about)]
pub struct Cli {
    /// Suppress colored output (useful for CI/CD pipelines)
    #[arg(short = 'n', long = "no-color", global = true)]
    pub no_color: bool,

    /// Enable verbose output for debugging
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,

    /// App configuration directory containing the permissions/ directory
    #[arg(
        short = 'd',
        long = "app-dir",
        env = "PERMCHECK_APP_DIR",
        default_value = ".",
        global = true
    )]
    pub app_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compare permission boundaries for discrepancies
    ///
    /// Loads provision_boundary.json, deprovision_boundary.json,
    /// maintenance_boundary.json and breakglass_boundary.json from the
    /// permissions/ directory. Missing files are left out of the comparison.
    /// Exits with status 1 when a high-severity discrepancy is found.
    CheckBoundaries {
        /// Output format: text, json
        #[arg(short = 'o', long = "output", default_value = "text")]
        output: OutputMode,
    },

    /// Check for overlapping IAM actions across policy documents
    ///
    /// MANIFEST is a permission TOML file with [[policies]] entries. It is
    /// used as given when it exists, otherwise it is looked up under the
    /// permissions/ directory (e.g. `check-overlap maintenance.toml`).
    /// Exits with status 1 when any overlap is found.
    CheckOverlap {
        /// Permission manifest listing the policy documents
        manifest: PathBuf,

        /// Output format: text, json
        #[arg(short = 'o', long = "output", default_value = "text")]
        output: OutputMode,
    },
}

impl Command {
    pub fn output_mode(&self) -> OutputMode {
        match self {
            Command::CheckBoundaries { output } | Command::CheckOverlap { output, .. } => *output,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Tables grouped by severity or policy pair
    #[default]
    Text,
    /// Structured findings only
    Json,
}
