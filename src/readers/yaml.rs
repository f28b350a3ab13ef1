//! Structured-text (YAML) definitions
//!
//! ```yaml
//! objects:
//!   - object: app
//!     class: shop.App
//!     scope: prototype
//!     constructor-args: [ {ref: db}, 8080 ]
//!     properties:
//!       hosts: {tuple: [a, b]}
//!       pool: {object: pool, class: shop.Pool}
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value as Yaml};

use crate::error::ReadError;
use crate::model::{
    element_name, entry_name, inner_object_id, positional_arg_name, BuiltinType, Factory, Literal,
    ObjectDefinition, ValueDefinition,
};
use crate::template::{resolve_templates, DraftDefinition};

use super::{DefinitionReader, Source};

#[derive(Debug, Deserialize)]
struct ObjectsDocument {
    objects: Vec<Mapping>,
}

/// Reader for YAML `objects:` documents
#[derive(Debug, Clone)]
pub struct YamlConfig {
    sources: Vec<Source>,
}

impl YamlConfig {
    pub fn new<S: Into<Source>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

impl DefinitionReader for YamlConfig {
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError> {
        let mut objects = Vec::new();
        for source in &self.sources {
            let location = source.location();
            tracing::debug!(source = %location, "parsing structured text");

            let text = source.load()?;
            let document: ObjectsDocument = serde_yaml_ng::from_str(&text)
                .map_err(|e| ReadError::malformed(&location, e.to_string()))?;

            let mut converter = YamlConverter::new(&location);
            let mut drafts = Vec::with_capacity(document.objects.len());
            for declaration in &document.objects {
                drafts.push(converter.read_declaration(declaration)?);
            }
            objects.extend(resolve_templates(&location, &drafts)?);
        }
        Ok(objects)
    }
}

fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Yaml> {
    mapping.get(key)
}

fn get_str<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a str> {
    get(mapping, key).and_then(Yaml::as_str)
}

/// Flags may be written as booleans or as strings
fn get_flag(mapping: &Mapping, key: &str) -> bool {
    match get(mapping, key) {
        Some(Yaml::Bool(b)) => *b,
        Some(Yaml::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Mapping keys are plain scalars
fn key_string(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(true) => Some("True".to_string()),
        Yaml::Bool(false) => Some("False".to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Null => Some("None".to_string()),
        _ => None,
    }
}

/// Scalars read as text, the same as markup values
fn scalar(name: &str, value: &Yaml) -> Option<ValueDefinition> {
    let literal = match value {
        Yaml::Null => Literal::None,
        Yaml::Bool(b) => Literal::Bool(*b),
        Yaml::Number(n) => Literal::text(n.to_string()),
        Yaml::String(s) => Literal::text(s.as_str()),
        _ => return None,
    };
    Some(ValueDefinition::scalar(name, literal))
}

struct YamlConverter<'l> {
    location: &'l str,
    inner: Vec<ObjectDefinition>,
}

impl<'l> YamlConverter<'l> {
    fn new(location: &'l str) -> Self {
        Self {
            location,
            inner: Vec::new(),
        }
    }

    fn read_declaration(&mut self, declaration: &Mapping) -> Result<DraftDefinition, ReadError> {
        let id = match get(declaration, "object") {
            Some(Yaml::String(id)) => id.clone(),
            Some(other) => key_string(other).unwrap_or_default(),
            None => {
                return Err(ReadError::malformed(
                    self.location,
                    "declaration without an 'object' id",
                ))
            }
        };
        let mut draft = self.extract(declaration, id)?;
        draft.inner = std::mem::take(&mut self.inner);
        Ok(draft)
    }

    fn extract(&mut self, declaration: &Mapping, id: String) -> Result<DraftDefinition, ReadError> {
        let class = self.attribute(declaration, &id, "class");
        let mut draft = DraftDefinition::new(id, Factory::from_class(class));
        if let Some(value) = get(declaration, "scope") {
            let token = key_string(value).unwrap_or_else(|| format!("{:?}", value));
            draft.scope = token.parse().map_err(|source| ReadError::UnknownScope {
                location: self.location.to_string(),
                object: draft.id.clone(),
                source,
            })?;
        }
        draft.lazy_init = get_flag(declaration, "lazy-init");
        draft.is_abstract = get_flag(declaration, "abstract");
        draft.parent = self
            .attribute(declaration, &draft.id, "parent")
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim().to_string());

        if !draft.factory.is_specified() && draft.parent.is_none() {
            let shorthand = BuiltinType::ALL
                .iter()
                .find_map(|t| get(declaration, t.name()).map(|value| (*t, value)));
            match shorthand {
                Some((builtin, value)) => {
                    draft.factory = Factory::Builtin(builtin);
                    let value = self.convert(&draft.id, value, &positional_arg_name(0))?;
                    draft.args.positional.push(value);
                    return Ok(draft);
                }
                None => tracing::warn!(
                    source = %self.location,
                    object = %draft.id,
                    "no matching type found for object"
                ),
            }
        }

        match get(declaration, "constructor-args") {
            Some(Yaml::Sequence(args)) => {
                for (index, arg) in args.iter().enumerate() {
                    // `~` leaves the slot open for a template
                    let value = match arg {
                        Yaml::Null => None,
                        _ => self.convert(&draft.id, arg, &positional_arg_name(index))?,
                    };
                    draft.args.positional.push(value);
                }
            }
            Some(Yaml::Mapping(args)) => {
                for (key, arg) in args {
                    let Some(name) = key_string(key) else {
                        self.skipped(&draft.id, "constructor-args");
                        continue;
                    };
                    match self.convert(&draft.id, arg, &name)? {
                        Some(value) => {
                            draft.args.named.insert(name, value);
                        }
                        None => self.skipped(&draft.id, &name),
                    }
                }
            }
            Some(_) => self.skipped(&draft.id, "constructor-args"),
            None => {}
        }

        match get(declaration, "properties") {
            Some(Yaml::Mapping(properties)) => {
                for (key, property) in properties {
                    let Some(name) = key_string(key) else {
                        self.skipped(&draft.id, "properties");
                        continue;
                    };
                    match self.convert(&draft.id, property, &name)? {
                        Some(value) => draft.args.properties.push(value),
                        None => self.skipped(&draft.id, &name),
                    }
                }
            }
            Some(_) => self.skipped(&draft.id, "properties"),
            None => {}
        }

        Ok(draft)
    }

    /// String-valued declaration key; other values are logged and ignored
    fn attribute<'m>(&self, declaration: &'m Mapping, object: &str, key: &str) -> Option<&'m str> {
        let value = get(declaration, key)?;
        if value.as_str().is_none() {
            tracing::warn!(
                source = %self.location,
                object = %object,
                key = key,
                "ignoring non-string value"
            );
        }
        value.as_str()
    }

    fn skipped(&self, object: &str, name: &str) {
        tracing::warn!(
            source = %self.location,
            object = %object,
            property = %name,
            "unrecognized value shape, skipping"
        );
    }

    fn convert(
        &mut self,
        owner: &str,
        value: &Yaml,
        name: &str,
    ) -> Result<Option<ValueDefinition>, ReadError> {
        match value {
            Yaml::Mapping(mapping) => self.convert_mapping(owner, mapping, name),
            Yaml::Sequence(items) => Ok(Some(ValueDefinition::list(
                name,
                self.convert_items(owner, items, name, "list")?,
            ))),
            Yaml::Tagged(tagged) => {
                tracing::warn!(value = %name, tag = %tagged.tag, "tagged values are not supported");
                Ok(None)
            }
            other => Ok(scalar(name, other)),
        }
    }

    /// A mapping is either one of the tagged shapes (`ref`, `tuple`, ...), an
    /// inline object, or a plain dictionary
    fn convert_mapping(
        &mut self,
        owner: &str,
        mapping: &Mapping,
        name: &str,
    ) -> Result<Option<ValueDefinition>, ReadError> {
        if let Some(target) = get(mapping, "ref") {
            let target = match target {
                Yaml::Mapping(m) => get_str(m, "object"),
                other => other.as_str(),
            };
            return Ok(target.map(|t| ValueDefinition::reference(name, t)));
        }

        let sequence = |key: &str| match get(mapping, key) {
            Some(Yaml::Sequence(items)) => Some(items),
            _ => None,
        };
        if let Some(items) = sequence("tuple") {
            let items = self.convert_items(owner, items, name, "tuple")?;
            return Ok(Some(ValueDefinition::tuple(name, items)));
        }
        if let Some(items) = sequence("set") {
            let items = self.convert_items(owner, items, name, "set")?;
            return Ok(Some(ValueDefinition::set(name, items)));
        }
        if let Some(items) = sequence("frozenset") {
            let items = self.convert_items(owner, items, name, "set")?;
            return Ok(Some(ValueDefinition::frozen_set(name, items)));
        }
        if let Some(items) = sequence("list") {
            let items = self.convert_items(owner, items, name, "list")?;
            return Ok(Some(ValueDefinition::list(name, items)));
        }
        if let Some(Yaml::Mapping(entries)) = get(mapping, "dict") {
            return self.convert_dict(owner, entries, name).map(Some);
        }
        if mapping.contains_key("object") || mapping.contains_key("class") {
            return self.convert_inline(owner, mapping, name).map(Some);
        }
        self.convert_dict(owner, mapping, name).map(Some)
    }

    fn convert_dict(
        &mut self,
        owner: &str,
        mapping: &Mapping,
        name: &str,
    ) -> Result<ValueDefinition, ReadError> {
        let mut entries = IndexMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(key) = key_string(key) else {
                tracing::warn!(value = %name, "dictionary key is not a scalar");
                continue;
            };
            let value_name = entry_name(name, &key);
            match self.convert(owner, value, &value_name)? {
                Some(value) => {
                    entries.insert(key, value);
                }
                None => tracing::warn!(value = %value_name, "don't know how to handle entry"),
            }
        }
        Ok(ValueDefinition::mapping(name, entries))
    }

    fn convert_items(
        &mut self,
        owner: &str,
        items: &[Yaml],
        name: &str,
        shape: &str,
    ) -> Result<Vec<ValueDefinition>, ReadError> {
        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            let item_name = element_name(name, shape, converted.len());
            match self.convert(owner, item, &item_name)? {
                Some(value) => converted.push(value),
                None => tracing::warn!(value = %item_name, "don't know how to handle element"),
            }
        }
        Ok(converted)
    }

    fn convert_inline(
        &mut self,
        owner: &str,
        mapping: &Mapping,
        path: &str,
    ) -> Result<ValueDefinition, ReadError> {
        let explicit = get(mapping, "object").and_then(key_string);
        let id = inner_object_id(owner, path, explicit.as_deref());
        let definition = self.extract(mapping, id)?.into_definition();
        tracing::debug!(object = %definition.id, "parsed inline object");
        self.inner.push(definition.clone());
        Ok(ValueDefinition::inner_object(path, definition))
    }
}
