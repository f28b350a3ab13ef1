//! Object definitions and scopes

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

use super::factory::Factory;
use super::value::ValueDefinition;

/// Lifecycle tag recorded on a definition. Enforcement belongs to the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One shared instance per container
    #[default]
    Singleton,
    /// A new instance per request
    Prototype,
}

/// An explicitly given scope token that is not recognized
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown scope '{token}' (expected singleton or prototype)")]
pub struct ScopeError {
    pub token: String,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Prototype => "prototype",
        }
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "scope.SINGLETON" => Ok(Scope::Singleton),
            "scope.PROTOTYPE" => Ok(Scope::Prototype),
            t if t.eq_ignore_ascii_case("singleton") => Ok(Scope::Singleton),
            t if t.eq_ignore_ascii_case("prototype") => Ok(Scope::Prototype),
            _ => Err(ScopeError {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dialect-neutral description of one thing to be constructed
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
    /// Unique id within one resolved collection
    pub id: String,
    /// What gets constructed
    pub factory: Factory,
    pub scope: Scope,
    pub lazy_init: bool,
    /// Templates are never instantiated directly
    pub is_abstract: bool,
    /// Id of the template this definition inherits from
    pub parent: Option<String>,
    /// Positional constructor arguments; `None` marks an empty slot
    pub constructor_args: Vec<Option<ValueDefinition>>,
    /// Named constructor arguments in declaration order
    pub named_args: IndexMap<String, ValueDefinition>,
    /// Properties in declaration order
    pub properties: Vec<ValueDefinition>,
}

impl ObjectDefinition {
    /// Create a singleton definition with no arguments or properties
    pub fn new(id: impl Into<String>, factory: Factory) -> Self {
        Self {
            id: id.into(),
            factory,
            scope: Scope::Singleton,
            lazy_init: false,
            is_abstract: false,
            parent: None,
            constructor_args: Vec::new(),
            named_args: IndexMap::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_constructor_arg(mut self, arg: Option<ValueDefinition>) -> Self {
        self.constructor_args.push(arg);
        self
    }

    pub fn with_named_arg(mut self, name: impl Into<String>, value: ValueDefinition) -> Self {
        self.named_args.insert(name.into(), value);
        self
    }

    pub fn with_property(mut self, property: ValueDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&ValueDefinition> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for ObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {} ({}", self.id, self.scope)?;
        if self.lazy_init {
            write!(f, ", lazy-init")?;
        }
        if self.is_abstract {
            write!(f, ", abstract")?;
        }
        if let Some(parent) = &self.parent {
            write!(f, ", parent={}", parent)?;
        }
        write!(f, ") <- {}", self.factory)?;

        for (index, arg) in self.constructor_args.iter().enumerate() {
            match arg {
                Some(value) => write!(f, "\n  arg[{}] = {}", index, value)?,
                None => write!(f, "\n  arg[{}] = <unset>", index)?,
            }
        }
        for (name, value) in &self.named_args {
            write!(f, "\n  arg {} = {}", name, value)?;
        }
        for property in &self.properties {
            write!(f, "\n  property {} = {}", property.name(), property)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    #[test]
    fn test_scope_tokens() {
        assert_eq!("singleton".parse::<Scope>(), Ok(Scope::Singleton));
        assert_eq!("PROTOTYPE".parse::<Scope>(), Ok(Scope::Prototype));
        assert_eq!("scope.PROTOTYPE".parse::<Scope>(), Ok(Scope::Prototype));
    }

    #[test]
    fn test_unknown_scope_is_an_error() {
        let err = "session".parse::<Scope>().unwrap_err();
        assert_eq!(err.token, "session");
        assert!(err.to_string().contains("session"));
    }

    #[test]
    fn test_display_lists_arguments_and_properties() {
        let def = ObjectDefinition::new("app", Factory::reflective("shop.App"))
            .with_scope(Scope::Prototype)
            .with_constructor_arg(None)
            .with_constructor_arg(Some(ValueDefinition::reference("constr[1]", "db")))
            .with_property(ValueDefinition::scalar("debug", Literal::Bool(true)));

        insta::assert_snapshot!(def.to_string(), @r###"
        object app (prototype) <- shop.App
          arg[0] = <unset>
          arg[1] = ref(db)
          property debug = true
        "###);
    }
}
