//! Syntax tree for literal expressions

use indexmap::IndexMap;

use crate::model::{element_name, entry_name, Literal, ValueDefinition};

/// A parsed literal expression
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralExpr {
    Atom(Literal),
    List(Vec<LiteralExpr>),
    Tuple(Vec<LiteralExpr>),
    Set(Vec<LiteralExpr>),
    /// Keys are plain scalars
    Dict(Vec<(Literal, LiteralExpr)>),
}

impl LiteralExpr {
    /// Convert into a value definition named `name`. Elements are named after
    /// their position (or key) below `name`.
    pub fn into_value_definition(self, name: &str) -> ValueDefinition {
        match self {
            LiteralExpr::Atom(Literal::Str(s)) => ValueDefinition::text(name, s),
            LiteralExpr::Atom(literal) => ValueDefinition::scalar(name, literal),
            LiteralExpr::List(items) => {
                ValueDefinition::list(name, convert_items(items, name, "list"))
            }
            LiteralExpr::Tuple(items) => {
                ValueDefinition::tuple(name, convert_items(items, name, "tuple"))
            }
            LiteralExpr::Set(items) => ValueDefinition::set(name, convert_items(items, name, "set")),
            LiteralExpr::Dict(entries) => {
                let mut mapping = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = key.key_string();
                    let value = value.into_value_definition(&entry_name(name, &key));
                    // later duplicates win, as with a literal dict
                    mapping.insert(key, value);
                }
                ValueDefinition::mapping(name, mapping)
            }
        }
    }
}

fn convert_items(items: Vec<LiteralExpr>, name: &str, shape: &str) -> Vec<ValueDefinition> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.into_value_definition(&element_name(name, shape, i)))
        .collect()
}
