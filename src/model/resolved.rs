//! Live values produced by resolution

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

/// A live object handed out by a registry
pub type Instance = Arc<dyn Any + Send + Sync>;

fn instance_addr(instance: &Instance) -> *const () {
    Arc::as_ptr(instance) as *const ()
}

/// Immutable unique collection
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FrozenSet(Arc<IndexSet<Value>>);

impl FrozenSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }
}

impl From<IndexSet<Value>> for FrozenSet {
    fn from(set: IndexSet<Value>) -> Self {
        FrozenSet(Arc::new(set))
    }
}

impl fmt::Debug for FrozenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

/// A resolved value
///
/// Objects compare and hash by identity, so a set of references to one
/// singleton collapses to a single element.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(Instance),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(IndexSet<Value>),
    FrozenSet(FrozenSet),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => instance_addr(a) == instance_addr(b),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::FrozenSet(a), Value::FrozenSet(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Object(instance) => instance_addr(instance).hash(state),
            Value::List(items) | Value::Tuple(items) => items.hash(state),
            // unordered equality: only the size is order independent
            Value::Set(set) => set.len().hash(state),
            Value::FrozenSet(set) => set.len().hash(state),
            Value::Map(map) => map.len().hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{:?}", b),
            Value::Int(n) => write!(f, "{:?}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(instance) => write!(f, "Object({:p})", instance_addr(instance)),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items {
                    t.field(item);
                }
                t.finish()
            }
            Value::Set(set) => f.debug_set().entries(set.iter()).finish(),
            Value::FrozenSet(set) => write!(f, "frozen{:?}", set),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}
