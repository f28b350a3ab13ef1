//! Programmatic definitions registered in code

use crate::error::ReadError;
use crate::model::{
    Factory, Instance, ObjectDefinition, ProgrammaticFactory, Registry, RegistryError, Scope,
};

use super::DefinitionReader;

/// One registered factory function and its container attributes
#[derive(Debug, Clone)]
pub struct ObjectDeclaration {
    name: String,
    factory: ProgrammaticFactory,
    scope: Scope,
    lazy_init: bool,
    is_abstract: bool,
}

impl ObjectDeclaration {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&dyn Registry) -> Result<Instance, RegistryError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self::with_factory(name.clone(), ProgrammaticFactory::new(name, build))
    }

    /// A declaration whose factory is handed the instance of `parent`, fetched
    /// through the registry's template lookup
    pub fn derived<F>(name: impl Into<String>, parent: impl Into<String>, build: F) -> Self
    where
        F: Fn(&dyn Registry, Instance) -> Result<Instance, RegistryError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self::with_factory(name.clone(), ProgrammaticFactory::derived(name, parent, build))
    }

    fn with_factory(name: String, factory: ProgrammaticFactory) -> Self {
        Self {
            name,
            factory,
            scope: Scope::default(),
            lazy_init: false,
            is_abstract: false,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn abstract_template(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_definition(&self) -> ObjectDefinition {
        let mut definition =
            ObjectDefinition::new(&self.name, Factory::Programmatic(self.factory.clone()))
                .with_scope(self.scope)
                .with_lazy_init(self.lazy_init)
                .with_abstract(self.is_abstract);
        definition.parent = self.factory.parent().map(str::to_string);
        definition
    }
}

/// Reader over declarations registered in code
///
/// ```
/// use std::sync::Arc;
/// use objdef::{DefinitionReader, Instance, ObjectDeclaration, ProgrammaticConfig, Scope};
///
/// let mut config = ProgrammaticConfig::new()
///     .declare(ObjectDeclaration::new("greeting", |_| Ok(Arc::new("hello") as Instance)))
///     .declare(
///         ObjectDeclaration::new("counter", |_| Ok(Arc::new(0_u32) as Instance))
///             .scope(Scope::Prototype),
///     );
///
/// let objects = config.read_definitions().unwrap();
/// assert_eq!(objects.len(), 2);
/// assert_eq!(objects[1].scope, Scope::Prototype);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgrammaticConfig {
    declarations: Vec<ObjectDeclaration>,
}

impl ProgrammaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(mut self, declaration: ObjectDeclaration) -> Self {
        self.register(declaration);
        self
    }

    /// Add a declaration. A later declaration replaces an earlier one of the
    /// same name in place.
    pub fn register(&mut self, declaration: ObjectDeclaration) -> &mut Self {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.name == declaration.name)
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
        self
    }
}

impl DefinitionReader for ProgrammaticConfig {
    fn read_definitions(&mut self) -> Result<Vec<ObjectDefinition>, ReadError> {
        let objects: Vec<_> = self
            .declarations
            .iter()
            .map(ObjectDeclaration::to_definition)
            .collect();
        for object in &objects {
            tracing::debug!(object = %object.id, "registered programmatic object");
        }
        Ok(objects)
    }
}
