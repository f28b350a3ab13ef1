//! Declarations as extracted from a source, before template chains are merged

use indexmap::IndexMap;

use crate::model::{Factory, ObjectDefinition, Scope, ValueDefinition};

/// Constructor arguments and properties of one declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedArgs {
    /// `None` marks a slot left open for a template to fill
    pub positional: Vec<Option<ValueDefinition>>,
    pub named: IndexMap<String, ValueDefinition>,
    pub properties: Vec<ValueDefinition>,
}

impl ExtractedArgs {
    /// Fold a parent's arguments underneath these. Entries already present win.
    pub fn merge_parent(&mut self, parent: &ExtractedArgs) {
        if self.positional.len() < parent.positional.len() {
            self.positional.resize(parent.positional.len(), None);
        }
        for (slot, inherited) in self.positional.iter_mut().zip(&parent.positional) {
            if slot.is_none() {
                slot.clone_from(inherited);
            }
        }

        for (name, value) in &parent.named {
            if !self.named.contains_key(name) {
                self.named.insert(name.clone(), value.clone());
            }
        }

        for property in &parent.properties {
            if !self.properties.iter().any(|p| p.name() == property.name()) {
                self.properties.push(property.clone());
            }
        }
    }
}

/// One top-level declaration of a source
#[derive(Debug, Clone, PartialEq)]
pub struct DraftDefinition {
    pub id: String,
    pub factory: Factory,
    pub scope: Scope,
    pub lazy_init: bool,
    pub is_abstract: bool,
    pub parent: Option<String>,
    pub args: ExtractedArgs,
    /// Inline definitions found while extracting `args`, in document order
    pub inner: Vec<ObjectDefinition>,
}

impl DraftDefinition {
    pub fn new(id: impl Into<String>, factory: Factory) -> Self {
        Self {
            id: id.into(),
            factory,
            scope: Scope::default(),
            lazy_init: false,
            is_abstract: false,
            parent: None,
            args: ExtractedArgs::default(),
            inner: Vec::new(),
        }
    }

    /// Build the final definition from these attributes and `args`
    pub fn build(&self, factory: Factory, args: ExtractedArgs) -> ObjectDefinition {
        ObjectDefinition {
            id: self.id.clone(),
            factory,
            scope: self.scope,
            lazy_init: self.lazy_init,
            is_abstract: self.is_abstract,
            parent: self.parent.clone(),
            constructor_args: args.positional,
            named_args: args.named,
            properties: args.properties,
        }
    }

    /// The definition as declared, without consulting any template
    pub fn into_definition(mut self) -> ObjectDefinition {
        let args = std::mem::take(&mut self.args);
        let factory = self.factory.clone();
        self.build(factory, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(name: &str, value: &str) -> ValueDefinition {
        ValueDefinition::text(name, value)
    }

    #[test]
    fn test_merge_pads_and_fills_open_slots() {
        let mut leaf = ExtractedArgs {
            positional: vec![None, Some(text("constr[1]", "leaf"))],
            ..Default::default()
        };
        let parent = ExtractedArgs {
            positional: vec![
                Some(text("constr[0]", "p0")),
                Some(text("constr[1]", "p1")),
                Some(text("constr[2]", "p2")),
            ],
            ..Default::default()
        };

        leaf.merge_parent(&parent);

        assert_eq!(
            leaf.positional,
            vec![
                Some(text("constr[0]", "p0")),
                Some(text("constr[1]", "leaf")),
                Some(text("constr[2]", "p2")),
            ]
        );
    }

    #[test]
    fn test_merge_keeps_existing_named_and_properties() {
        let mut leaf = ExtractedArgs::default();
        leaf.named.insert("host".into(), text("host", "leaf"));
        leaf.properties.push(text("debug", "True"));

        let mut parent = ExtractedArgs::default();
        parent.named.insert("host".into(), text("host", "parent"));
        parent.named.insert("port".into(), text("port", "80"));
        parent.properties.push(text("debug", "False"));
        parent.properties.push(text("name", "svc"));

        leaf.merge_parent(&parent);

        assert_eq!(leaf.named["host"], text("host", "leaf"));
        assert_eq!(leaf.named["port"], text("port", "80"));
        assert_eq!(
            leaf.properties,
            vec![text("debug", "True"), text("name", "svc")]
        );
    }
}
