//! The registry contract that resolution runs against

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::resolved::Instance;

/// Failures signaled by a registry while resolving values
///
/// Readers never produce these; they surface lazily from
/// [`ValueDefinition::resolve`](super::ValueDefinition::resolve) and are
/// passed through unmodified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No object is registered under the requested id
    #[error("unknown reference: no object named '{id}'")]
    UnknownReference { id: String },

    /// The id names a template that cannot be instantiated directly
    #[error("object '{id}' is abstract and cannot be instantiated")]
    AbstractInstantiation { id: String },

    /// Building the object failed inside its factory
    #[error("factory for '{id}' failed: {message}")]
    Factory { id: String, message: String },
}

impl RegistryError {
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownReference { id: id.into() }
    }

    pub fn factory(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Factory {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// A source of live objects, supplied by the container at resolution time
pub trait Registry {
    /// Fetch the live object registered under `id`
    fn get_object(&self, id: &str) -> Result<Instance, RegistryError>;

    /// Fetch an object for use as a parent template. Unlike
    /// [`get_object`](Registry::get_object) this may materialize abstract
    /// definitions.
    fn get_template_object(&self, id: &str) -> Result<Instance, RegistryError> {
        self.get_object(id)
    }
}

/// Fixed id -> instance registry
///
/// Holds prebuilt instances only; it exists for tests and tooling that need
/// to drive resolution without a full container.
#[derive(Default)]
pub struct StaticRegistry {
    objects: HashMap<String, Instance>,
    templates: HashSet<String>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, instance: Instance) {
        self.objects.insert(id.into(), instance);
    }

    /// Register an instance that is only reachable as a parent template
    pub fn insert_abstract(&mut self, id: impl Into<String>, instance: Instance) {
        let id = id.into();
        self.templates.insert(id.clone());
        self.objects.insert(id, instance);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }
}

impl Registry for StaticRegistry {
    fn get_object(&self, id: &str) -> Result<Instance, RegistryError> {
        if self.templates.contains(id) {
            return Err(RegistryError::AbstractInstantiation { id: id.to_string() });
        }
        self.get_template_object(id)
    }

    fn get_template_object(&self, id: &str) -> Result<Instance, RegistryError> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::unknown(id))
    }
}
