//! Permission manifest schema.
//!
//! A manifest is a TOML file listing the policy documents attached to one
//! role:
//!
//! ```toml
//! [[policies]]
//! name = "{{.nuon.install.id}}-storage"
//! contents = "./policies/storage.json"
//! ```
//!
//! Other keys are ignored.

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

/// Name used for entries without a string `name`.
const DEFAULT_POLICY_NAME: &str = "unnamed";

/// Errors that can occur while reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A permission manifest.
///
/// Decoded from a `toml::Table` rather than a strict derive so that one
/// badly typed entry does not discard the others. Only TOML syntax errors
/// reject the whole manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub policies: Vec<ManifestPolicy>,
}

/// One `[[policies]]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPolicy {
    pub name: String,

    /// Path of the policy JSON, relative to the manifest's directory.
    /// `None` when the entry has no string `contents`.
    pub contents: Option<String>,
}

impl ManifestPolicy {
    fn from_value(value: &Value) -> Self {
        let Some(entry) = value.as_table() else {
            log::warn!("Ignoring [[policies]] entry that is not a table");
            return Self {
                name: DEFAULT_POLICY_NAME.to_string(),
                contents: None,
            };
        };

        let name = match entry.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                log::warn!(
                    "Policy name {} is not a string, using '{}'",
                    other,
                    DEFAULT_POLICY_NAME
                );
                DEFAULT_POLICY_NAME.to_string()
            }
            None => DEFAULT_POLICY_NAME.to_string(),
        };

        let contents = entry
            .get("contents")
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        Self { name, contents }
    }
}

impl Manifest {
    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let table: Table = toml::from_str(content)?;

        let policies = match table.get("policies") {
            Some(Value::Array(entries)) => entries.iter().map(ManifestPolicy::from_value).collect(),
            Some(_) => {
                log::warn!("Ignoring `policies` key that is not an array of tables");
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(Self { policies })
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
