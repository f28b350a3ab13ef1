//! Shared machinery for the markup dialects

use indexmap::IndexMap;
use roxmltree::{Document, Node};

use crate::error::ReadError;
use crate::model::{
    element_name, entry_name, inner_object_id, positional_arg_name, BuiltinType, Factory,
    ObjectDefinition, Scope, ValueDefinition,
};
use crate::template::DraftDefinition;

pub(crate) fn parse_document<'i>(text: &'i str, location: &str) -> Result<Document<'i>, ReadError> {
    Document::parse(text).map_err(|e| ReadError::malformed(location, e.to_string()))
}

/// Check the root element's name and namespace, returning the namespace
pub(crate) fn expect_root(
    root: Node,
    name: &str,
    namespaces: &[&str],
    location: &str,
) -> Result<String, ReadError> {
    let tag = root.tag_name();
    match tag.namespace() {
        Some(ns) if tag.name() == name && namespaces.contains(&ns) => Ok(ns.to_string()),
        ns => Err(ReadError::malformed(
            location,
            format!(
                "expected root <{}> in one of {:?}, found <{}> in {:?}",
                name,
                namespaces,
                tag.name(),
                ns.unwrap_or("")
            ),
        )),
    }
}

pub(crate) fn is_named(node: Node, ns: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(ns)
}

pub(crate) fn elements<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children().filter(|n| n.is_element())
}

pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, ns: &str, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| is_named(*n, ns, name))
}

/// Text content of the element itself, across comments and CDATA sections.
/// Empty when it has none.
pub(crate) fn text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Boolean attribute value
pub(crate) fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true") || value.trim() == "1"
}

/// Scope attribute of a declaration; absent means singleton
pub(crate) fn read_scope(node: Node, location: &str, object: &str) -> Result<Scope, ReadError> {
    match node.attribute("scope") {
        None => Ok(Scope::default()),
        Some(token) => token.parse().map_err(|source| ReadError::UnknownScope {
            location: location.to_string(),
            object: object.to_string(),
            source,
        }),
    }
}

/// Element and attribute names that differ between markup dialects
#[derive(Debug)]
pub(crate) struct Vocabulary {
    pub root: &'static str,
    pub namespaces: &'static [&'static str],
    /// Declaration element, also used for inline definitions
    pub object: &'static str,
    /// Attribute of `<ref>` naming the target
    pub ref_target: &'static str,
    pub mapping: &'static str,
    pub templates: bool,
    pub scalar_shorthand: bool,
}

/// Converts declarations of one markup document into drafts
pub(crate) struct MarkupConverter<'v, 'l> {
    vocab: &'v Vocabulary,
    ns: String,
    location: &'l str,
    /// Inline definitions of the declaration being converted
    inner: Vec<ObjectDefinition>,
}

impl<'v, 'l> MarkupConverter<'v, 'l> {
    pub fn new(vocab: &'v Vocabulary, ns: String, location: &'l str) -> Self {
        Self {
            vocab,
            ns,
            location,
            inner: Vec::new(),
        }
    }

    /// Convert every top-level declaration under `root`
    pub fn read_declarations(&mut self, root: Node) -> Result<Vec<DraftDefinition>, ReadError> {
        let mut drafts = Vec::new();
        for node in elements(root) {
            if node.tag_name().namespace() != Some(self.ns.as_str()) {
                tracing::warn!(
                    source = %self.location,
                    element = node.tag_name().name(),
                    "skipping element from a foreign namespace"
                );
                continue;
            }
            drafts.push(self.read_declaration(node)?);
        }
        Ok(drafts)
    }

    pub fn read_declaration(&mut self, node: Node) -> Result<DraftDefinition, ReadError> {
        let id = node.attribute("id").unwrap_or_default().to_string();
        if id.is_empty() {
            tracing::warn!(source = %self.location, "declaration without an id");
        }
        let mut draft = self.extract(node, id)?;
        draft.inner = std::mem::take(&mut self.inner);
        Ok(draft)
    }

    fn extract(&mut self, node: Node, id: String) -> Result<DraftDefinition, ReadError> {
        let ns = self.ns.clone();
        let mut draft = DraftDefinition::new(id, Factory::from_class(node.attribute("class")));
        draft.scope = read_scope(node, self.location, &draft.id)?;
        draft.lazy_init = node.attribute("lazy-init").is_some_and(parse_flag);
        draft.is_abstract = node.attribute("abstract").is_some_and(parse_flag);
        if self.vocab.templates {
            draft.parent = node
                .attribute("parent")
                .filter(|p| !p.trim().is_empty())
                .map(|p| p.trim().to_string());
        }

        if !draft.factory.is_specified() && draft.parent.is_none() {
            match self.scalar_shorthand(node) {
                Some(builtin) => {
                    draft.factory = Factory::Builtin(builtin);
                    draft
                        .args
                        .positional
                        .push(Some(ValueDefinition::text(positional_arg_name(0), text(node))));
                    return Ok(draft);
                }
                None => tracing::warn!(
                    source = %self.location,
                    object = %draft.id,
                    element = node.tag_name().name(),
                    "no matching type found for object"
                ),
            }
        }

        for arg in node.children().filter(|n| is_named(*n, &ns, "constructor-arg")) {
            match arg.attribute("name") {
                Some(name) => match self.convert_slot(&draft.id, arg, name)? {
                    Some(value) => {
                        draft.args.named.insert(name.to_string(), value);
                    }
                    None => self.skipped(&draft.id, name),
                },
                None => {
                    let name = positional_arg_name(draft.args.positional.len());
                    let value = self.convert_slot(&draft.id, arg, &name)?;
                    draft.args.positional.push(value);
                }
            }
        }

        for property in node.children().filter(|n| is_named(*n, &ns, "property")) {
            let Some(name) = property.attribute("name") else {
                tracing::warn!(source = %self.location, object = %draft.id, "property without a name");
                continue;
            };
            match self.convert_slot(&draft.id, property, name)? {
                Some(value) => draft.args.properties.push(value),
                None => self.skipped(&draft.id, name),
            }
        }

        Ok(draft)
    }

    fn scalar_shorthand(&self, node: Node) -> Option<BuiltinType> {
        if !self.vocab.scalar_shorthand {
            return None;
        }
        BuiltinType::lookup(&BuiltinType::SCALARS, node.tag_name().name())
    }

    fn skipped(&self, object: &str, name: &str) {
        tracing::warn!(
            source = %self.location,
            object = %object,
            property = %name,
            "unrecognized value shape, skipping"
        );
    }

    /// Value of a `constructor-arg` or `property` element. `None` when it
    /// holds nothing recognizable.
    fn convert_slot(
        &mut self,
        owner: &str,
        node: Node,
        name: &str,
    ) -> Result<Option<ValueDefinition>, ReadError> {
        if let Some(target) = node.attribute("ref") {
            return Ok(Some(ValueDefinition::reference(name, target)));
        }
        if let Some(value) = node.attribute("value") {
            return Ok(Some(ValueDefinition::text(name, value)));
        }
        match elements(node).next() {
            Some(element) => self.convert_element(owner, element, name),
            None => Ok(None),
        }
    }

    fn convert_element(
        &mut self,
        owner: &str,
        node: Node,
        name: &str,
    ) -> Result<Option<ValueDefinition>, ReadError> {
        if node.tag_name().namespace() != Some(self.ns.as_str()) {
            tracing::warn!(element = node.tag_name().name(), "element from a foreign namespace");
            return Ok(None);
        }

        let value = match node.tag_name().name() {
            "ref" => self.convert_ref(node, name),
            "value" => return self.convert_value(owner, node, name),
            "props" => Some(self.convert_props(node, name)),
            "list" => Some(ValueDefinition::list(
                name,
                self.convert_items(owner, node, name, "list")?,
            )),
            "tuple" => Some(ValueDefinition::tuple(
                name,
                self.convert_items(owner, node, name, "tuple")?,
            )),
            "set" => Some(ValueDefinition::set(
                name,
                self.convert_items(owner, node, name, "set")?,
            )),
            "frozenset" => Some(ValueDefinition::frozen_set(
                name,
                self.convert_items(owner, node, name, "set")?,
            )),
            tag if tag == self.vocab.mapping => Some(self.convert_mapping(owner, node, name)?),
            tag if tag == self.vocab.object => Some(self.convert_inline(owner, node, name)?),
            other => {
                tracing::warn!(element = other, value = %name, "don't know how to handle element");
                None
            }
        };
        Ok(value)
    }

    fn convert_ref(&self, node: Node, name: &str) -> Option<ValueDefinition> {
        let content = text(node);
        let target = node
            .attribute(self.vocab.ref_target)
            .or_else(|| node.attribute("local"))
            .or_else(|| Some(content.trim()).filter(|t| !t.is_empty()));
        match target {
            Some(target) => Some(ValueDefinition::reference(name, target)),
            None => {
                tracing::warn!(value = %name, "reference without a target");
                None
            }
        }
    }

    /// `<value>` holds either text or a single nested collection
    fn convert_value(
        &mut self,
        owner: &str,
        node: Node,
        name: &str,
    ) -> Result<Option<ValueDefinition>, ReadError> {
        let content = text(node);
        if !content.trim().is_empty() {
            return Ok(Some(ValueDefinition::text(name, content)));
        }
        match elements(node).next() {
            Some(nested) => self.convert_element(owner, nested, name),
            None => Ok(Some(ValueDefinition::text(name, content))),
        }
    }

    fn convert_items(
        &mut self,
        owner: &str,
        node: Node,
        name: &str,
        shape: &str,
    ) -> Result<Vec<ValueDefinition>, ReadError> {
        let mut items = Vec::new();
        for element in elements(node) {
            let item_name = element_name(name, shape, items.len());
            if let Some(item) = self.convert_element(owner, element, &item_name)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn convert_mapping(
        &mut self,
        owner: &str,
        node: Node,
        name: &str,
    ) -> Result<ValueDefinition, ReadError> {
        let ns = self.ns.clone();
        let mut entries = IndexMap::new();
        for entry in node.children().filter(|n| is_named(*n, &ns, "entry")) {
            let key = entry.attribute("key").map(str::to_string).or_else(|| {
                child(entry, &ns, "key")
                    .and_then(|k| child(k, &ns, "value"))
                    .map(text)
            });
            let Some(key) = key else {
                tracing::warn!(value = %name, "mapping entry without a key");
                continue;
            };

            let value_name = entry_name(name, &key);
            let value = match elements(entry).find(|e| !is_named(*e, &ns, "key")) {
                Some(element) => self.convert_element(owner, element, &value_name)?,
                None => entry
                    .attribute("value")
                    .map(|v| ValueDefinition::text(&value_name, v)),
            };
            match value {
                Some(value) => {
                    entries.insert(key, value);
                }
                None => tracing::warn!(value = %value_name, "don't know how to handle entry"),
            }
        }
        Ok(ValueDefinition::mapping(name, entries))
    }

    /// `<props>` maps string keys to string values
    fn convert_props(&self, node: Node, name: &str) -> ValueDefinition {
        let mut entries = IndexMap::new();
        for prop in node.children().filter(|n| is_named(*n, &self.ns, "prop")) {
            let key = prop.attribute("key").unwrap_or_default().to_string();
            let value = ValueDefinition::text(entry_name(name, &key), text(prop));
            entries.insert(key, value);
        }
        ValueDefinition::mapping(name, entries)
    }

    /// An inline definition is collected for the result and referenced by
    /// its synthesized id
    fn convert_inline(
        &mut self,
        owner: &str,
        node: Node,
        path: &str,
    ) -> Result<ValueDefinition, ReadError> {
        let id = inner_object_id(owner, path, node.attribute("id"));
        let definition = self.extract(node, id)?.into_definition();
        tracing::debug!(object = %definition.id, "parsed inline object");
        self.inner.push(definition.clone());
        Ok(ValueDefinition::inner_object(path, definition))
    }
}
