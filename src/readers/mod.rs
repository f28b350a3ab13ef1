//! Dialect readers
//!
//! Every reader turns its configured sources into one ordered collection of
//! [`ObjectDefinition`]s through [`DefinitionReader::read_definitions`].
//! Sources are read in order and each read starts from an empty collection,
//! so calling it twice yields equal results.

mod legacy;
mod markup;
mod programmatic;
mod spring_beans;
mod xml;
mod yaml;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReadError;
use crate::model::ObjectDefinition;

pub use legacy::LegacyXmlConfig;
pub use programmatic::{ObjectDeclaration, ProgrammaticConfig};
pub use spring_beans::SpringBeansConfig;
pub use xml::XmlConfig;
pub use yaml::YamlConfig;

/// Namespace of the legacy component dialect
pub const LEGACY_NS: &str =
    "http://www.springframework.org/springpython/schema/pycontainer-components";
/// Namespace of the current object dialect
pub const OBJECTS_NS: &str = "http://www.springframework.org/springpython/schema/objects";
/// Namespace of the current object dialect, schema version 1.1
pub const OBJECTS_NS_11: &str = "http://www.springframework.org/springpython/schema/objects/1.1";
/// Namespace of the bean dialect
pub const BEANS_NS: &str = "http://www.springframework.org/schema/beans";

/// Turns configured sources into object definitions
pub trait DefinitionReader {
    /// Read every configured source, in order, into a fresh collection
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError>;
}

/// Where a reader takes its text from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    /// In-memory text with a display name for error messages
    Inline { name: String, content: String },
}

impl Source {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source::File(path.into())
    }

    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Source::Inline {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Human-readable location used in logs and errors
    pub fn location(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Inline { name, .. } => name.clone(),
        }
    }

    /// Path of a file source
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File(path) => Some(path),
            Source::Inline { .. } => None,
        }
    }

    pub fn load(&self) -> Result<String, ReadError> {
        match self {
            Source::File(path) => std::fs::read_to_string(path).map_err(|error| ReadError::Io {
                location: self.location(),
                error,
            }),
            Source::Inline { content, .. } => Ok(content.clone()),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::File(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::File(path.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::File(PathBuf::from(path))
    }
}

/// The file dialects a source can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Legacy component markup
    Legacy,
    /// Current object markup (1.0 and 1.1 schemas)
    Objects,
    /// Bean markup
    SpringBeans,
    /// Structured text
    Yaml,
}

impl Dialect {
    /// Work out the dialect of a source from its extension or, for markup,
    /// from the namespace of its root element.
    pub fn detect(source: &Source) -> Result<Dialect, ReadError> {
        let by_extension = source
            .path()
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        if matches!(by_extension.as_deref(), Some("yaml" | "yml")) {
            return Ok(Dialect::Yaml);
        }

        let location = source.location();
        let text = source.load()?;
        if !text.trim_start().starts_with('<') {
            // not markup; structured text is the only other dialect
            return Ok(Dialect::Yaml);
        }
        let document = markup::parse_document(&text, &location)?;
        let root = document.root_element();
        match root.tag_name().namespace() {
            Some(LEGACY_NS) => Ok(Dialect::Legacy),
            Some(OBJECTS_NS) | Some(OBJECTS_NS_11) => Ok(Dialect::Objects),
            Some(BEANS_NS) => Ok(Dialect::SpringBeans),
            other => Err(ReadError::malformed(
                location,
                format!(
                    "cannot tell the dialect of root element <{}> in namespace {:?}",
                    root.tag_name().name(),
                    other.unwrap_or("")
                ),
            )),
        }
    }

    /// A reader of this dialect over `sources`
    pub fn reader(self, sources: Vec<Source>) -> Box<dyn DefinitionReader> {
        match self {
            Dialect::Legacy => Box::new(LegacyXmlConfig::new(sources)),
            Dialect::Objects => Box::new(XmlConfig::new(sources)),
            Dialect::SpringBeans => Box::new(SpringBeansConfig::new(sources)),
            Dialect::Yaml => Box::new(YamlConfig::new(sources)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Legacy => "legacy",
            Dialect::Objects => "objects",
            Dialect::SpringBeans => "spring-beans",
            Dialect::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read `sources` in order, grouping consecutive sources of the same dialect
/// into one reader. A `None` dialect is detected per source.
pub fn read_sources(
    sources: impl IntoIterator<Item = (Source, Option<Dialect>)>,
) -> Result<Vec<ObjectDefinition>, ReadError> {
    let mut groups: Vec<(Dialect, Vec<Source>)> = Vec::new();
    for (source, dialect) in sources {
        let dialect = match dialect {
            Some(dialect) => dialect,
            None => Dialect::detect(&source)?,
        };
        tracing::debug!(source = %source.location(), %dialect, "selected dialect");
        match groups.last_mut() {
            Some((last, group)) if *last == dialect => group.push(source),
            _ => groups.push((dialect, vec![source])),
        }
    }

    let mut objects = Vec::new();
    for (dialect, group) in groups {
        objects.extend(dialect.reader(group).read_definitions()?);
    }
    Ok(objects)
}
