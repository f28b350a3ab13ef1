//! Factory handles carried by object definitions
//!
//! This layer only builds and threads factories through. The programmatic
//! variant is the one kind that is directly invocable, and only the container
//! invokes it.

use std::fmt;
use std::sync::Arc;

use super::registry::{Registry, RegistryError};
use super::resolved::Instance;

/// Built-in scalar and collection types reachable through the declaration shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Str,
    Unicode,
    Int,
    Long,
    Float,
    Decimal,
    Bool,
    Complex,
    List,
    Tuple,
    Dict,
}

impl BuiltinType {
    /// Scalar shorthand accepted by the markup dialects
    pub const SCALARS: [BuiltinType; 8] = [
        BuiltinType::Str,
        BuiltinType::Unicode,
        BuiltinType::Int,
        BuiltinType::Long,
        BuiltinType::Float,
        BuiltinType::Decimal,
        BuiltinType::Bool,
        BuiltinType::Complex,
    ];

    /// Shorthand accepted by the structured-text dialect
    pub const ALL: [BuiltinType; 11] = [
        BuiltinType::Str,
        BuiltinType::Unicode,
        BuiltinType::Int,
        BuiltinType::Long,
        BuiltinType::Float,
        BuiltinType::Decimal,
        BuiltinType::Bool,
        BuiltinType::Complex,
        BuiltinType::List,
        BuiltinType::Tuple,
        BuiltinType::Dict,
    ];

    /// Declaration name of this type
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Str => "str",
            BuiltinType::Unicode => "unicode",
            BuiltinType::Int => "int",
            BuiltinType::Long => "long",
            BuiltinType::Float => "float",
            BuiltinType::Decimal => "decimal",
            BuiltinType::Bool => "bool",
            BuiltinType::Complex => "complex",
            BuiltinType::List => "list",
            BuiltinType::Tuple => "tuple",
            BuiltinType::Dict => "dict",
        }
    }

    /// Look up a declaration name in one of the shorthand tables
    pub fn lookup(table: &[BuiltinType], name: &str) -> Option<BuiltinType> {
        table.iter().copied().find(|t| t.name() == name)
    }
}

/// Plain programmatic factory body
pub type ObjectFn = dyn Fn(&dyn Registry) -> Result<Instance, RegistryError> + Send + Sync;

/// Factory body that receives its resolved parent template
pub type DerivedObjectFn =
    dyn Fn(&dyn Registry, Instance) -> Result<Instance, RegistryError> + Send + Sync;

#[derive(Clone)]
enum Body {
    Plain(Arc<ObjectFn>),
    Derived {
        parent: String,
        build: Arc<DerivedObjectFn>,
    },
}

/// Factory registered through the programmatic dialect
#[derive(Clone)]
pub struct ProgrammaticFactory {
    name: String,
    body: Body,
}

impl ProgrammaticFactory {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&dyn Registry) -> Result<Instance, RegistryError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Body::Plain(Arc::new(build)),
        }
    }

    pub fn derived<F>(name: impl Into<String>, parent: impl Into<String>, build: F) -> Self
    where
        F: Fn(&dyn Registry, Instance) -> Result<Instance, RegistryError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Body::Derived {
                parent: parent.into(),
                build: Arc::new(build),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template this factory feeds from, if any
    pub fn parent(&self) -> Option<&str> {
        match &self.body {
            Body::Plain(_) => None,
            Body::Derived { parent, .. } => Some(parent),
        }
    }

    /// Build an instance. A declared parent is fetched through the registry's
    /// template lookup first and handed to the body.
    pub fn invoke(&self, registry: &dyn Registry) -> Result<Instance, RegistryError> {
        match &self.body {
            Body::Plain(build) => build(registry),
            Body::Derived { parent, build } => {
                tracing::debug!(object = %self.name, parent = %parent, "resolving parent template");
                let parent_instance = registry.get_template_object(parent)?;
                build(registry, parent_instance)
            }
        }
    }
}

impl PartialEq for ProgrammaticFactory {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.body, &other.body) {
            (Body::Plain(a), Body::Plain(b)) => Arc::ptr_eq(a, b),
            (
                Body::Derived { parent: pa, build: a },
                Body::Derived { parent: pb, build: b },
            ) => pa == pb && Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ProgrammaticFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgrammaticFactory")
            .field("name", &self.name)
            .field("parent", &self.parent())
            .finish_non_exhaustive()
    }
}

/// Target-type handle of a definition
#[derive(Debug, Clone, PartialEq)]
pub enum Factory {
    /// Dotted type path constructed reflectively by the container
    Reflective { type_name: String },
    /// Built-in type from the declaration shorthand
    Builtin(BuiltinType),
    /// Function registered through the programmatic dialect
    Programmatic(ProgrammaticFactory),
    /// Nothing declared (e.g. a template without a class)
    Unspecified,
}

impl Factory {
    pub fn reflective(type_name: impl Into<String>) -> Self {
        Factory::Reflective {
            type_name: type_name.into(),
        }
    }

    /// Reflective factory for a declared class, or `Unspecified` when absent
    pub fn from_class(class: Option<&str>) -> Self {
        match class {
            Some(name) if !name.trim().is_empty() => Factory::reflective(name.trim()),
            _ => Factory::Unspecified,
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, Factory::Unspecified)
    }
}

impl fmt::Display for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Reflective { type_name } => f.write_str(type_name),
            Factory::Builtin(t) => write!(f, "builtin:{}", t.name()),
            Factory::Programmatic(p) => write!(f, "fn:{}", p.name()),
            Factory::Unspecified => f.write_str("<unspecified>"),
        }
    }
}
