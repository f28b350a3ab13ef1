//! Current object markup, schema 1.0 and 1.1

use crate::error::ReadError;
use crate::model::ObjectDefinition;
use crate::template::resolve_templates;

use super::markup::{self, MarkupConverter, Vocabulary};
use super::{DefinitionReader, Source, OBJECTS_NS, OBJECTS_NS_11};

static OBJECTS: Vocabulary = Vocabulary {
    root: "objects",
    namespaces: &[OBJECTS_NS, OBJECTS_NS_11],
    object: "object",
    ref_target: "object",
    mapping: "dict",
    templates: true,
    scalar_shorthand: true,
};

/// Reader for `<objects>` documents
///
/// Supports abstract/parent templates, inline objects, the scalar-type
/// shorthand (`<int id="port">8080</int>`) and nested collections.
#[derive(Debug, Clone)]
pub struct XmlConfig {
    sources: Vec<Source>,
}

impl XmlConfig {
    pub fn new<S: Into<Source>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

impl DefinitionReader for XmlConfig {
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError> {
        let mut objects = Vec::new();
        for source in &self.sources {
            let location = source.location();
            tracing::debug!(source = %location, "parsing object markup");

            let text = source.load()?;
            let document = markup::parse_document(&text, &location)?;
            let root = document.root_element();
            // 1.0 and 1.1 documents may be mixed, so the namespace is per source
            let ns = markup::expect_root(root, OBJECTS.root, OBJECTS.namespaces, &location)?;

            let drafts = MarkupConverter::new(&OBJECTS, ns, &location).read_declarations(root)?;
            objects.extend(resolve_templates(&location, &drafts)?);
        }
        Ok(objects)
    }
}
