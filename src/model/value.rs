//! Value definitions and their lazy resolution

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::definition::ObjectDefinition;
use super::registry::{Registry, RegistryError};
use super::resolved::{FrozenSet, Value};

/// An opaque literal stored in a scalar definition
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Literal {
    /// Literal from source text; `"True"` and `"False"` become booleans
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        match text.as_str() {
            "True" => Literal::Bool(true),
            "False" => Literal::Bool(false),
            _ => Literal::Str(text),
        }
    }

    /// Plain string form, used for mapping keys
    pub fn key_string(&self) -> String {
        match self {
            Literal::None => "None".to_string(),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Int(n) => n.to_string(),
            Literal::Float(x) => x.to_string(),
            Literal::Str(s) => s.clone(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::None => Value::None,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(x) => Value::Float(*x),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => f.write_str("none"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Unresolved value of a property, constructor argument or collection element
///
/// References and inner objects only turn into live objects when
/// [`ValueDefinition::resolve`] is handed a registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueDefinition {
    Scalar {
        name: String,
        value: Literal,
    },
    Reference {
        name: String,
        target: String,
    },
    /// The nested definition is also part of the reader's result collection
    InnerObject {
        name: String,
        definition: Box<ObjectDefinition>,
    },
    Mapping {
        name: String,
        entries: IndexMap<String, ValueDefinition>,
    },
    OrderedSequence {
        name: String,
        items: Vec<ValueDefinition>,
    },
    UniqueSequence {
        name: String,
        items: Vec<ValueDefinition>,
    },
    FrozenUniqueSequence {
        name: String,
        items: Vec<ValueDefinition>,
    },
    Tuple {
        name: String,
        items: Vec<ValueDefinition>,
    },
}

impl ValueDefinition {
    pub fn scalar(name: impl Into<String>, value: Literal) -> Self {
        ValueDefinition::Scalar {
            name: name.into(),
            value,
        }
    }

    /// Scalar from source text, with boolean coercion
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::scalar(name, Literal::text(text))
    }

    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        ValueDefinition::Reference {
            name: name.into(),
            target: target.into(),
        }
    }

    pub fn inner_object(name: impl Into<String>, definition: ObjectDefinition) -> Self {
        ValueDefinition::InnerObject {
            name: name.into(),
            definition: Box::new(definition),
        }
    }

    pub fn mapping(name: impl Into<String>, entries: IndexMap<String, ValueDefinition>) -> Self {
        ValueDefinition::Mapping {
            name: name.into(),
            entries,
        }
    }

    pub fn list(name: impl Into<String>, items: Vec<ValueDefinition>) -> Self {
        ValueDefinition::OrderedSequence {
            name: name.into(),
            items,
        }
    }

    pub fn set(name: impl Into<String>, items: Vec<ValueDefinition>) -> Self {
        ValueDefinition::UniqueSequence {
            name: name.into(),
            items,
        }
    }

    pub fn frozen_set(name: impl Into<String>, items: Vec<ValueDefinition>) -> Self {
        ValueDefinition::FrozenUniqueSequence {
            name: name.into(),
            items,
        }
    }

    pub fn tuple(name: impl Into<String>, items: Vec<ValueDefinition>) -> Self {
        ValueDefinition::Tuple {
            name: name.into(),
            items,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueDefinition::Scalar { name, .. }
            | ValueDefinition::Reference { name, .. }
            | ValueDefinition::InnerObject { name, .. }
            | ValueDefinition::Mapping { name, .. }
            | ValueDefinition::OrderedSequence { name, .. }
            | ValueDefinition::UniqueSequence { name, .. }
            | ValueDefinition::FrozenUniqueSequence { name, .. }
            | ValueDefinition::Tuple { name, .. } => name,
        }
    }

    /// Same value under another name
    pub fn renamed(mut self, new_name: impl Into<String>) -> Self {
        let new_name = new_name.into();
        match &mut self {
            ValueDefinition::Scalar { name, .. }
            | ValueDefinition::Reference { name, .. }
            | ValueDefinition::InnerObject { name, .. }
            | ValueDefinition::Mapping { name, .. }
            | ValueDefinition::OrderedSequence { name, .. }
            | ValueDefinition::UniqueSequence { name, .. }
            | ValueDefinition::FrozenUniqueSequence { name, .. }
            | ValueDefinition::Tuple { name, .. } => *name = new_name,
        }
        self
    }

    /// Turn this definition into a live value using `registry`.
    ///
    /// Scalars pass through, references and inner objects are fetched by id,
    /// and collections are rebuilt element by element in their own shape. The
    /// definition itself is left untouched, so resolving is repeatable.
    pub fn resolve<R: Registry + ?Sized>(&self, registry: &R) -> Result<Value, RegistryError> {
        match self {
            ValueDefinition::Scalar { value, .. } => Ok(value.to_value()),
            ValueDefinition::Reference { target, .. } => {
                registry.get_object(target).map(Value::Object)
            }
            ValueDefinition::InnerObject { definition, .. } => {
                registry.get_object(&definition.id).map(Value::Object)
            }
            ValueDefinition::Mapping { entries, .. } => {
                let mut resolved = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    resolved.insert(key.clone(), entry.resolve(registry)?);
                }
                Ok(Value::Map(resolved))
            }
            ValueDefinition::OrderedSequence { items, .. } => {
                resolve_items(items, registry).map(Value::List)
            }
            ValueDefinition::Tuple { items, .. } => resolve_items(items, registry).map(Value::Tuple),
            ValueDefinition::UniqueSequence { items, .. } => {
                let set: IndexSet<Value> = resolve_items(items, registry)?.into_iter().collect();
                Ok(Value::Set(set))
            }
            ValueDefinition::FrozenUniqueSequence { items, .. } => {
                let set: IndexSet<Value> = resolve_items(items, registry)?.into_iter().collect();
                Ok(Value::FrozenSet(FrozenSet::from(set)))
            }
        }
    }
}

fn resolve_items<R: Registry + ?Sized>(
    items: &[ValueDefinition],
    registry: &R,
) -> Result<Vec<Value>, RegistryError> {
    items.iter().map(|item| item.resolve(registry)).collect()
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[ValueDefinition]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for ValueDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDefinition::Scalar { value, .. } => write!(f, "{}", value),
            ValueDefinition::Reference { target, .. } => write!(f, "ref({})", target),
            ValueDefinition::InnerObject { definition, .. } => {
                write!(f, "object({})", definition.id)
            }
            ValueDefinition::Mapping { entries, .. } => {
                f.write_str("{")?;
                for (index, (key, entry)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", key, entry)?;
                }
                f.write_str("}")
            }
            ValueDefinition::OrderedSequence { items, .. } => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            ValueDefinition::UniqueSequence { items, .. } => {
                f.write_str("set{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            ValueDefinition::FrozenUniqueSequence { items, .. } => {
                f.write_str("frozenset{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            ValueDefinition::Tuple { items, .. } => {
                f.write_str("(")?;
                write_items(f, items)?;
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Factory, Instance, StaticRegistry};
    use std::sync::Arc;

    fn registry_with_db() -> (StaticRegistry, Instance) {
        let db: Instance = Arc::new(String::from("db-connection"));
        let mut registry = StaticRegistry::new();
        registry.insert("db", db.clone());
        (registry, db)
    }

    #[test]
    fn test_text_coerces_booleans_only_for_exact_tokens() {
        assert_eq!(Literal::text("True"), Literal::Bool(true));
        assert_eq!(Literal::text("False"), Literal::Bool(false));
        assert_eq!(Literal::text("true"), Literal::Str("true".into()));
    }

    #[test]
    fn test_scalar_resolves_to_literal() {
        let (registry, _) = registry_with_db();
        let value = ValueDefinition::text("flag", "True").resolve(&registry).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_reference_resolves_to_registered_instance() {
        let (registry, db) = registry_with_db();
        let value = ValueDefinition::reference("db", "db").resolve(&registry).unwrap();
        assert_eq!(value, Value::Object(db));
    }

    #[test]
    fn test_inner_object_resolves_by_inner_id() {
        let mut registry = StaticRegistry::new();
        let pool: Instance = Arc::new(5_u8);
        registry.insert("app.pool.<anonymous>", pool.clone());
        let inner = ObjectDefinition::new("app.pool.<anonymous>", Factory::reflective("Pool"));

        let value = ValueDefinition::inner_object("pool", inner)
            .resolve(&registry)
            .unwrap();
        assert_eq!(value, Value::Object(pool));
    }

    #[test]
    fn test_nested_collections_resolve_recursively() {
        let (registry, db) = registry_with_db();
        let mut entries = IndexMap::new();
        entries.insert("conn".to_string(), ValueDefinition::reference("m.dict['conn']", "db"));
        entries.insert(
            "ports".to_string(),
            ValueDefinition::tuple(
                "m.dict['ports']",
                vec![
                    ValueDefinition::scalar("p0", Literal::Int(80)),
                    ValueDefinition::scalar("p1", Literal::Int(443)),
                ],
            ),
        );
        let mapping = ValueDefinition::mapping("m", entries);

        let mut expected = IndexMap::new();
        expected.insert("conn".to_string(), Value::Object(db));
        expected.insert(
            "ports".to_string(),
            Value::Tuple(vec![Value::Int(80), Value::Int(443)]),
        );
        assert_eq!(mapping.resolve(&registry).unwrap(), Value::Map(expected));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let (registry, _) = registry_with_db();
        let list = ValueDefinition::list(
            "items",
            vec![
                ValueDefinition::reference("items.list[0]", "db"),
                ValueDefinition::text("items.list[1]", "x"),
            ],
        );
        let before = list.clone();
        let first = list.resolve(&registry).unwrap();
        let second = list.resolve(&registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(list, before);
    }

    #[test]
    fn test_missing_reference_propagates_registry_error() {
        let registry = StaticRegistry::new();
        let err = ValueDefinition::reference("db", "db")
            .resolve(&registry)
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownReference { id: "db".into() });
    }

    #[test]
    fn test_renamed_keeps_value() {
        let renamed = ValueDefinition::reference("a", "db").renamed("b");
        assert_eq!(renamed, ValueDefinition::reference("b", "db"));
    }
}
