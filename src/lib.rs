//! objdef - object definitions for a dependency-injection container
//!
//! This library reads object definitions from several configuration dialects
//! into one dialect-neutral model. Values inside a definition stay unresolved
//! until a container hands a [`Registry`] to [`ValueDefinition::resolve`].
//!
//! # Example
//!
//! ```rust
//! use objdef::{DefinitionReader, Source, XmlConfig};
//!
//! let xml = r#"
//!     <objects xmlns="http://www.springframework.org/springpython/schema/objects">
//!         <object id="base" class="shop.Service" abstract="true">
//!             <constructor-arg><value>A</value></constructor-arg>
//!             <constructor-arg><value>B</value></constructor-arg>
//!         </object>
//!         <object id="child" parent="base">
//!             <constructor-arg/>
//!             <constructor-arg><value>C</value></constructor-arg>
//!             <constructor-arg><value>D</value></constructor-arg>
//!         </object>
//!     </objects>"#;
//!
//! let objects = XmlConfig::new([Source::inline("context.xml", xml)])
//!     .read_definitions()
//!     .unwrap();
//!
//! let child = &objects[1];
//! assert_eq!(child.factory.to_string(), "shop.Service");
//! assert_eq!(child.constructor_args.len(), 3);
//! ```

pub mod error;
pub mod literal;
pub mod manifest;
pub mod model;
pub mod readers;
pub mod template;

use std::path::{Path, PathBuf};

pub use error::{LiteralError, ReadError};
pub use manifest::{Manifest, ManifestError, SourceEntry};
pub use model::{
    BuiltinType, Factory, FrozenSet, Instance, Literal, ObjectDefinition, ProgrammaticFactory,
    Registry, RegistryError, Scope, ScopeError, StaticRegistry, Value, ValueDefinition,
};
pub use readers::{
    read_sources, DefinitionReader, Dialect, LegacyXmlConfig, ObjectDeclaration,
    ProgrammaticConfig, Source, SpringBeansConfig, XmlConfig, YamlConfig,
};

/// Options for reading files named on the command line
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Dialect forced for every file; detected per file when unset
    pub dialect: Option<Dialect>,
    /// Directory relative paths are resolved against
    pub base_dir: Option<PathBuf>,
}

impl ReadOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Force one dialect for every file
    pub fn with_dialect(mut self, dialect: Option<Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    /// Resolve relative paths against `base_dir`
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Read definition files in order
///
/// Consecutive files of the same dialect share one reader, so templates are
/// still looked up per file.
pub fn read_files<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
    options: &ReadOptions,
) -> Result<Vec<ObjectDefinition>, ReadError> {
    read_sources(
        paths
            .into_iter()
            .map(|path| (Source::File(options.resolve(path.as_ref())), options.dialect)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_options_builder() {
        let options = ReadOptions::new()
            .with_dialect(Some(Dialect::Yaml))
            .with_base_dir("/srv");
        assert_eq!(options.dialect, Some(Dialect::Yaml));
        assert_eq!(options.resolve(Path::new("ctx.yaml")), PathBuf::from("/srv/ctx.yaml"));
        assert_eq!(options.resolve(Path::new("/abs.yaml")), PathBuf::from("/abs.yaml"));
    }

    #[test]
    fn test_read_files_reports_missing_file() {
        let err = read_files(["no/such/file.yaml"], &ReadOptions::new()).unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }
}
