//! Dialect-neutral definition model
//!
//! Every reader produces [`ObjectDefinition`]s built from the types in this
//! module. Values stay unresolved ([`ValueDefinition`]) until a container
//! hands a [`Registry`] to [`ValueDefinition::resolve`], which turns them into
//! live [`Value`]s.

mod definition;
mod factory;
mod registry;
mod resolved;
mod value;

pub use definition::{ObjectDefinition, Scope, ScopeError};
pub use factory::{BuiltinType, DerivedObjectFn, Factory, ObjectFn, ProgrammaticFactory};
pub use registry::{Registry, RegistryError, StaticRegistry};
pub use resolved::{FrozenSet, Instance, Value};
pub use value::{Literal, ValueDefinition};

/// Placeholder used in synthesized ids when a definition has no explicit id.
pub const ANONYMOUS: &str = "<anonymous>";

/// Build the id of an inline definition declared under `owner` at `path`.
///
/// `owner` may be empty when the enclosing definition has no id of its own.
pub fn inner_object_id(owner: &str, path: &str, explicit: Option<&str>) -> String {
    let owner = if owner.is_empty() { ANONYMOUS } else { owner };
    format!("{}.{}.{}", owner, path, explicit.unwrap_or(ANONYMOUS))
}

/// Name of the `index`th element of a collection property.
pub fn element_name(name: &str, shape: &str, index: usize) -> String {
    format!("{}.{}[{}]", name, shape, index)
}

/// Name of a keyed entry of a mapping property.
pub fn entry_name(name: &str, key: &str) -> String {
    format!("{}.dict['{}']", name, key)
}

/// Name given to the `index`th positional constructor argument.
pub fn positional_arg_name(index: usize) -> String {
    format!("constr[{}]", index)
}
