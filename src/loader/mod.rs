//! Loading of boundary files and permission manifests.
//!
//! The loader is the only part of the crate that touches the filesystem. It
//! hands the analyzers fully materialized documents and records, per source,
//! whether it was loaded, missing, or invalid. Missing and invalid sources are
//! excluded from the comparison with a warning; only an absent configuration
//! directory or manifest is an error.

pub mod manifest;

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::analysis::{Boundary, PolicyActions};
use crate::policy::{DocumentError, PolicyDocument};
use manifest::Manifest;

/// Maximum policy file size (1 MB) to prevent resource exhaustion.
const MAX_POLICY_FILE_SIZE: u64 = 1024 * 1024;

/// Name of the directory holding boundaries and manifests.
pub const PERMISSIONS_DIR: &str = "permissions";

/// Errors that abort loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No permissions/ directory found in {}", .0.display())]
    PermissionsDirNotFound(PathBuf),

    #[error("Permission manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),
}

/// Reasons a single policy file could not be used.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large ({0} bytes)")]
    TooLarge(u64),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// The conventional lifecycle boundaries, in comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    Provision,
    Deprovision,
    Maintenance,
    Breakglass,
}

impl BoundaryKind {
    pub const ALL: [BoundaryKind; 4] = [
        BoundaryKind::Provision,
        BoundaryKind::Deprovision,
        BoundaryKind::Maintenance,
        BoundaryKind::Breakglass,
    ];

    /// Role name the comparator classifies by.
    pub fn name(&self) -> &'static str {
        use crate::analysis::boundary::{BREAKGLASS, DEPROVISION, MAINTENANCE, PROVISION};

        match self {
            BoundaryKind::Provision => PROVISION,
            BoundaryKind::Deprovision => DEPROVISION,
            BoundaryKind::Maintenance => MAINTENANCE,
            BoundaryKind::Breakglass => BREAKGLASS,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            BoundaryKind::Provision => "provision_boundary.json",
            BoundaryKind::Deprovision => "deprovision_boundary.json",
            BoundaryKind::Maintenance => "maintenance_boundary.json",
            BoundaryKind::Breakglass => "breakglass_boundary.json",
        }
    }
}

/// Outcome of loading one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, reason: String },
}

impl SourceStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SourceStatus::Loaded(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceStatus::Loaded(path) | SourceStatus::Missing(path) => path,
            SourceStatus::Invalid { path, .. } => path,
        }
    }
}

/// Explicit per-run context for locating configuration files.
#[derive(Debug, Clone)]
pub struct LoadContext {
    app_dir: PathBuf,
}

impl LoadContext {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn permissions_dir(&self) -> PathBuf {
        self.app_dir.join(PERMISSIONS_DIR)
    }

    pub fn boundary_path(&self, kind: BoundaryKind) -> PathBuf {
        self.permissions_dir().join(kind.file_name())
    }

    /// Locates a permission manifest.
    ///
    /// The argument is used as given when it names an existing file;
    /// otherwise it is looked up under the permissions directory.
    pub fn resolve_manifest(&self, manifest: &Path) -> Result<PathBuf, LoadError> {
        if manifest.is_file() {
            return Ok(manifest.to_path_buf());
        }

        let candidate = self.permissions_dir().join(manifest);
        if candidate.is_file() {
            log::debug!("Resolved manifest under permissions directory: {:?}", candidate);
            return Ok(candidate);
        }

        Err(LoadError::ManifestNotFound(manifest.to_path_buf()))
    }
}

/// Reads and decodes one policy JSON file.
pub fn read_policy_document(path: &Path) -> Result<PolicyDocument, SourceError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_POLICY_FILE_SIZE {
        return Err(SourceError::TooLarge(metadata.len()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(PolicyDocument::from_json_str(&content)?)
}

/// Loads `path`, recording a status instead of failing.
fn load_source(path: PathBuf) -> (SourceStatus, Option<PolicyDocument>) {
    if !path.is_file() {
        log::warn!("Missing policy file: {}", path.display());
        return (SourceStatus::Missing(path), None);
    }

    match read_policy_document(&path) {
        Ok(document) => {
            log::debug!(
                "Loaded {:?}: {} statements",
                path,
                document.statements.len()
            );
            (SourceStatus::Loaded(path), Some(document))
        }
        Err(e) => {
            log::warn!("Skipping {}: {}", path.display(), e);
            let reason = e.to_string();
            (SourceStatus::Invalid { path, reason }, None)
        }
    }
}

/// The boundaries available for comparison.
#[derive(Debug, Clone)]
pub struct LoadedBoundaries {
    /// Successfully loaded boundaries, in [`BoundaryKind::ALL`] order.
    pub boundaries: Vec<Boundary>,

    /// Status of every conventional boundary file.
    pub sources: Vec<(BoundaryKind, SourceStatus)>,
}

/// Loads the four conventional boundary files of an app directory.
///
/// Fails only when the permissions directory does not exist.
pub fn load_boundaries(ctx: &LoadContext) -> Result<LoadedBoundaries, LoadError> {
    if !ctx.permissions_dir().is_dir() {
        return Err(LoadError::PermissionsDirNotFound(ctx.app_dir().to_path_buf()));
    }

    let mut boundaries = Vec::new();
    let mut sources = Vec::new();

    for kind in BoundaryKind::ALL {
        let (status, document) = load_source(ctx.boundary_path(kind));
        if let Some(document) = document {
            boundaries.push(Boundary::new(kind.name(), document));
        }
        sources.push((kind, status));
    }

    Ok(LoadedBoundaries {
        boundaries,
        sources,
    })
}

/// One manifest entry and what became of it.
#[derive(Debug, Clone)]
pub struct PolicySource {
    /// Name as written in the manifest.
    pub name: String,

    /// Document identifier used in overlap reports: the file name, or the
    /// manifest-relative path when file names collide.
    pub document_id: String,

    pub status: SourceStatus,

    /// Number of distinct Sids, zero unless loaded.
    pub statements: usize,

    /// Number of actions across Sids, zero unless loaded.
    pub actions: usize,
}

/// The policies of a manifest available for overlap detection.
#[derive(Debug, Clone)]
pub struct LoadedPolicies {
    pub manifest: PathBuf,

    /// Set when the manifest itself could not be read or parsed.
    pub manifest_problem: Option<String>,

    pub sources: Vec<PolicySource>,

    /// Successfully loaded policies, in manifest order.
    pub policies: Vec<PolicyActions>,
}

impl LoadedPolicies {
    /// True when the manifest declares no policies at all.
    pub fn is_empty_manifest(&self) -> bool {
        self.sources.is_empty()
    }
}

fn file_name_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The manifest-relative path with `.` components removed, `/`-separated.
fn relative_id(contents: &str) -> String {
    Path::new(contents)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Picks the identifier for a policy document.
///
/// The file name is used while it is unique; documents sharing a file name
/// with an already loaded one are identified by their manifest-relative
/// path instead.
fn choose_document_id(path: &Path, contents: &str, taken: &[PolicyActions]) -> String {
    let is_taken = |id: &str| taken.iter().any(|policy| policy.name == id);

    let file_name = file_name_id(path);
    if !is_taken(&file_name) {
        return file_name;
    }

    let relative = relative_id(contents);
    if !relative.is_empty() && !is_taken(&relative) {
        log::debug!(
            "File name '{}' is already used, identifying {:?} as '{}'",
            file_name,
            path,
            relative
        );
        return relative;
    }

    path.display().to_string()
}

/// Loads every policy document referenced by a manifest.
///
/// Paths are resolved relative to the manifest's directory. An unreadable or
/// malformed manifest is reported through `manifest_problem` and yields no
/// policies. Entries without a string `contents` and repeated entries for the
/// same file are skipped with a warning.
pub fn load_manifest_policies(manifest_path: &Path) -> Result<LoadedPolicies, LoadError> {
    if !manifest_path.is_file() {
        return Err(LoadError::ManifestNotFound(manifest_path.to_path_buf()));
    }

    let mut loaded = LoadedPolicies {
        manifest: manifest_path.to_path_buf(),
        manifest_problem: None,
        sources: Vec::new(),
        policies: Vec::new(),
    };

    let manifest = match Manifest::load(manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            log::warn!("Cannot read manifest {}: {}", manifest_path.display(), e);
            loaded.manifest_problem = Some(e.to_string());
            return Ok(loaded);
        }
    };

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    log::debug!(
        "Manifest {:?} declares {} policies",
        manifest_path,
        manifest.policies.len()
    );

    let mut loaded_paths: Vec<PathBuf> = Vec::new();

    for entry in manifest.policies {
        let Some(contents) = entry.contents else {
            log::warn!(
                "Skipping policy '{}': `contents` is missing or not a string",
                entry.name
            );
            loaded.sources.push(PolicySource {
                name: entry.name,
                document_id: String::new(),
                status: SourceStatus::Invalid {
                    path: manifest_path.to_path_buf(),
                    reason: "No string `contents` path".to_string(),
                },
                statements: 0,
                actions: 0,
            });
            continue;
        };

        let path = base_dir.join(&contents);

        let (document_id, status, document) = if loaded_paths.contains(&path) {
            log::warn!(
                "Skipping {}: the file is already listed in the manifest",
                path.display()
            );
            let reason = "Duplicate manifest entry".to_string();
            (
                file_name_id(&path),
                SourceStatus::Invalid { path, reason },
                None,
            )
        } else {
            let document_id = choose_document_id(&path, &contents, &loaded.policies);
            let (status, document) = load_source(path);
            (document_id, status, document)
        };

        let (statements, actions) = match document {
            Some(document) => {
                loaded_paths.push(status.path().to_path_buf());
                let policy = PolicyActions::from_document(document_id.clone(), &document);
                let counts = (policy.by_sid.len(), policy.action_count());
                loaded.policies.push(policy);
                counts
            }
            None => (0, 0),
        };

        loaded.sources.push(PolicySource {
            name: entry.name,
            document_id,
            status,
            statements,
            actions,
        });
    }

    Ok(loaded)
}
