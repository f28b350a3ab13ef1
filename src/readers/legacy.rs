//! Legacy component markup

use roxmltree::Node;

use crate::error::ReadError;
use crate::literal::parse_literal;
use crate::model::{element_name, Factory, ObjectDefinition, ValueDefinition};

use super::markup::{self, child, elements, is_named, text};
use super::{DefinitionReader, Source, LEGACY_NS};

/// Reader for `<components>` documents
///
/// Declarations are flat. A property is a `local` reference, a `list` of
/// `local` references, or a literal expression such as `[1, 'two', (3,)]`.
/// Expressions outside the literal grammar are logged and skipped.
#[derive(Debug, Clone)]
pub struct LegacyXmlConfig {
    sources: Vec<Source>,
}

impl LegacyXmlConfig {
    pub fn new<S: Into<Source>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

impl DefinitionReader for LegacyXmlConfig {
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError> {
        let mut objects = Vec::new();
        for source in &self.sources {
            let location = source.location();
            tracing::debug!(source = %location, "parsing legacy components");

            let text = source.load()?;
            let document = markup::parse_document(&text, &location)?;
            let root = document.root_element();
            markup::expect_root(root, "components", &[LEGACY_NS], &location)?;

            for component in root.children().filter(|n| is_named(*n, LEGACY_NS, "component")) {
                let definition = convert_component(component, &location)?;
                tracing::debug!(object = %definition.id, "parsed object");
                objects.push(definition);
            }
        }
        Ok(objects)
    }
}

fn convert_component(component: Node, location: &str) -> Result<ObjectDefinition, ReadError> {
    let id = component.attribute("id").unwrap_or_default();
    let scope = markup::read_scope(component, location, id)?;
    let mut definition =
        ObjectDefinition::new(id, Factory::from_class(component.attribute("class"))).with_scope(scope);

    for property in component.children().filter(|n| is_named(*n, LEGACY_NS, "property")) {
        let name = property.attribute("name").unwrap_or_default();
        match convert_property(property, name, location) {
            Some(value) => definition.properties.push(value),
            None => tracing::warn!(
                source = %location,
                object = %definition.id,
                property = %name,
                "skipping property"
            ),
        }
    }
    Ok(definition)
}

fn convert_property(property: Node, name: &str, location: &str) -> Option<ValueDefinition> {
    if let Some(target) = property.attribute("local") {
        return Some(ValueDefinition::reference(name, target));
    }
    if let Some(local) = child(property, LEGACY_NS, "local") {
        return Some(ValueDefinition::reference(name, text(local).trim()));
    }
    if let Some(list) = child(property, LEGACY_NS, "list") {
        let items = elements(list)
            .filter(|n| is_named(*n, LEGACY_NS, "local"))
            .enumerate()
            .map(|(i, local)| {
                ValueDefinition::reference(element_name(name, "list", i), text(local).trim())
            })
            .collect();
        return Some(ValueDefinition::list(name, items));
    }

    let content = text(property);
    let expression = content.trim();
    match parse_literal(expression) {
        Ok(literal) => Some(literal.into_value_definition(name)),
        Err(errors) => {
            for error in errors {
                tracing::warn!(
                    source = %location,
                    property = %name,
                    "unsupported expression:\n{}",
                    error.format(expression, location)
                );
            }
            None
        }
    }
}
