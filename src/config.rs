use std::path::{Path, PathBuf};

use crate::cli::{Cli, Command, OutputMode};
use crate::error::PermcheckError;
use crate::loader::LoadContext;

#[derive(Debug)]
pub struct Config {
    pub no_color: bool,
    pub verbose: bool,
    pub app_dir: PathBuf,
    pub command: Command,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, PermcheckError> {
        let app_dir = Self::resolve_path(&cli.app_dir)?;

        // Verify the directory exists
        if !app_dir.exists() {
            return Err(PermcheckError::Config(format!(
                "App directory does not exist: {}",
                app_dir.display()
            )));
        }

        // Verify it's actually a directory
        if !app_dir.is_dir() {
            return Err(PermcheckError::Config(format!(
                "App directory is not a directory: {}",
                app_dir.display()
            )));
        }

        // Canonicalize to resolve symlinks and normalize path components
        let app_dir = app_dir.canonicalize().map_err(|e| {
            PermcheckError::Config(format!(
                "Cannot canonicalize app directory {}: {}",
                app_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            no_color: cli.no_color,
            verbose: cli.verbose,
            app_dir,
            command: cli.command,
        })
    }

    /// Resolves a path to an absolute path.
    /// - Absolute paths are returned as-is
    /// - Relative paths are resolved relative to current directory
    pub fn resolve_path(path: &Path) -> Result<PathBuf, PermcheckError> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().map_err(|e| {
                PermcheckError::Config(format!("Cannot determine current directory: {}", e))
            })?;
            Ok(current_dir.join(path))
        }
    }

    /// Context handed to the loader for this run.
    pub fn load_context(&self) -> LoadContext {
        LoadContext::new(&self.app_dir)
    }

    pub fn output_mode(&self) -> OutputMode {
        self.command.output_mode()
    }
}
