//! Source manifests
//!
//! A manifest lists definition sources in the order they should be read:
//!
//! ```toml
//! [[source]]
//! path = "base.xml"
//!
//! [[source]]
//! path = "overrides.yaml"
//! dialect = "yaml"
//! ```
//!
//! Relative paths are taken from the manifest's own directory. A source
//! without a `dialect` has it detected from its extension or root element.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::ReadError;
use crate::model::ObjectDefinition;
use crate::readers::{read_sources, Dialect, Source};

/// Errors that can occur when loading or parsing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse manifest TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// One `[[source]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

/// An ordered list of definition sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Directory relative paths are resolved against
    pub base_dir: PathBuf,
    pub sources: Vec<SourceEntry>,
}

/// TOML structure for deserializing manifests
#[derive(Deserialize)]
struct TomlManifest {
    #[serde(default)]
    source: Vec<SourceEntry>,
}

impl Manifest {
    /// Load manifest from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(Self::from_str(&content)?.with_base_dir(base_dir))
    }

    /// Load manifest from TOML string; paths resolve against the working directory
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let parsed: TomlManifest = toml::from_str(content)?;
        Ok(Manifest {
            base_dir: PathBuf::from("."),
            sources: parsed.source,
        })
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Sources with their paths resolved, paired with any declared dialect
    pub fn resolved_sources(&self) -> Vec<(Source, Option<Dialect>)> {
        self.sources
            .iter()
            .map(|entry| {
                let path = if entry.path.is_absolute() {
                    entry.path.clone()
                } else {
                    self.base_dir.join(&entry.path)
                };
                (Source::File(path), entry.dialect)
            })
            .collect()
    }

    /// Read every listed source, in order
    pub fn read_definitions(&self) -> Result<Vec<ObjectDefinition>, ReadError> {
        tracing::debug!(sources = self.sources.len(), base_dir = %self.base_dir.display(), "reading manifest");
        read_sources(self.resolved_sources())
    }
}
