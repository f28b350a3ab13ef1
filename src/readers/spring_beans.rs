//! Bean markup

use crate::error::ReadError;
use crate::model::ObjectDefinition;
use crate::template::resolve_templates;

use super::markup::{self, MarkupConverter, Vocabulary};
use super::{DefinitionReader, Source, BEANS_NS};

static BEANS: Vocabulary = Vocabulary {
    root: "beans",
    namespaces: &[BEANS_NS],
    object: "bean",
    ref_target: "bean",
    mapping: "map",
    templates: false,
    scalar_shorthand: false,
};

/// Reader for `<beans>` documents. Flat declarations with inline beans; no
/// templates.
#[derive(Debug, Clone)]
pub struct SpringBeansConfig {
    sources: Vec<Source>,
}

impl SpringBeansConfig {
    pub fn new<S: Into<Source>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

impl DefinitionReader for SpringBeansConfig {
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError> {
        let mut objects = Vec::new();
        for source in &self.sources {
            let location = source.location();
            tracing::debug!(source = %location, "parsing bean markup");

            let text = source.load()?;
            let document = markup::parse_document(&text, &location)?;
            let root = document.root_element();
            let ns = markup::expect_root(root, BEANS.root, BEANS.namespaces, &location)?;

            let drafts = MarkupConverter::new(&BEANS, ns, &location).read_declarations(root)?;
            objects.extend(resolve_templates(&location, &drafts)?);
        }
        Ok(objects)
    }
}
