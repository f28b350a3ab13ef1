//! Lazy resolution of read definitions against a registry

use std::cell::RefCell;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use objdef::{
    DefinitionReader, Factory, Instance, ObjectDeclaration, ObjectDefinition, ProgrammaticConfig,
    Registry, RegistryError, Source, StaticRegistry, Value, XmlConfig, YamlConfig,
};

/// Records every lookup before delegating
struct CountingRegistry {
    inner: StaticRegistry,
    lookups: RefCell<Vec<String>>,
}

impl CountingRegistry {
    fn new(ids: &[&str]) -> Self {
        let mut inner = StaticRegistry::new();
        for id in ids {
            inner.insert(*id, Arc::new(id.to_string()));
        }
        Self {
            inner,
            lookups: RefCell::new(Vec::new()),
        }
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl Registry for CountingRegistry {
    fn get_object(&self, id: &str) -> Result<Instance, RegistryError> {
        self.lookups.borrow_mut().push(id.to_string());
        self.inner.get_object(id)
    }
}

const CONTEXT: &str = r#"
objects:
  - object: service
    class: shop.Service
    properties:
      order: [{ref: db}, {ref: db}, {ref: cache}]
      unique: {set: [{ref: db}, {ref: db}]}
      fixed: {frozenset: [{ref: db}, {ref: cache}]}
      debug: "True"
      quiet: "False"
      pair: {tuple: [1, two]}
      env: {primary: {ref: db}, retries: 3}
"#;

fn read_context() -> Vec<ObjectDefinition> {
    YamlConfig::new([Source::inline("context.yaml", CONTEXT)])
        .read_definitions()
        .expect("Should read")
}

fn object(value: &Value) -> &str {
    value
        .as_object()
        .and_then(|o| o.downcast_ref::<String>())
        .map(String::as_str)
        .expect("expected a registry object")
}

#[test]
fn test_reading_never_touches_the_registry() {
    let registry = CountingRegistry::new(&[]);
    let objects = read_context();
    assert_eq!(objects.len(), 1);
    assert!(registry.lookups().is_empty());
}

#[test]
fn test_references_are_fetched_at_resolution() {
    let registry = CountingRegistry::new(&["db", "cache"]);
    let service = &read_context()[0];

    let order = service.property("order").unwrap().resolve(&registry).unwrap();
    let Value::List(items) = &order else {
        panic!("expected a list, got {:?}", order);
    };
    // duplicates survive in an ordered sequence
    assert_eq!(
        items.iter().map(object).collect::<Vec<_>>(),
        vec!["db", "db", "cache"]
    );
    assert_eq!(registry.lookups(), vec!["db", "db", "cache"]);
}

#[test]
fn test_unique_sequence_collapses_same_singleton() {
    let registry = CountingRegistry::new(&["db", "cache"]);
    let service = &read_context()[0];

    let unique = service.property("unique").unwrap().resolve(&registry).unwrap();
    let Value::Set(set) = unique else {
        panic!("expected a set");
    };
    assert_eq!(set.len(), 1);

    let fixed = service.property("fixed").unwrap().resolve(&registry).unwrap();
    let Value::FrozenSet(frozen) = fixed else {
        panic!("expected a frozen set");
    };
    assert_eq!(frozen.len(), 2);
    assert_eq!(frozen.iter().map(object).collect::<Vec<_>>(), vec!["db", "cache"]);
}

#[test]
fn test_scalars_and_coercion() {
    let registry = CountingRegistry::new(&["db"]);
    let service = &read_context()[0];

    let resolve = |name: &str| service.property(name).unwrap().resolve(&registry).unwrap();

    assert_eq!(resolve("debug"), Value::Bool(true));
    assert_eq!(resolve("quiet"), Value::Bool(false));
    assert_eq!(
        resolve("pair"),
        Value::Tuple(vec![Value::Str("1".into()), Value::Str("two".into())])
    );

    let Value::Map(env) = resolve("env") else {
        panic!("expected a map");
    };
    assert_eq!(object(&env["primary"]), "db");
    assert_eq!(env["retries"], Value::Str("3".into()));
}

#[test]
fn test_resolution_is_repeatable() {
    let registry = CountingRegistry::new(&["db", "cache"]);
    let service = &read_context()[0];
    let before = service.clone();

    let first = service.property("order").unwrap().resolve(&registry).unwrap();
    let second = service.property("order").unwrap().resolve(&registry).unwrap();

    assert_eq!(first, second);
    assert_eq!(service, &before);
}

#[test]
fn test_registry_errors_pass_through() {
    let registry = CountingRegistry::new(&["cache"]);
    let service = &read_context()[0];

    let err = service.property("fixed").unwrap().resolve(&registry).unwrap_err();
    assert_eq!(err, RegistryError::UnknownReference { id: "db".into() });

    let mut templates = StaticRegistry::new();
    templates.insert_abstract("db", Arc::new(()));
    let err = service.property("order").unwrap().resolve(&templates).unwrap_err();
    assert_eq!(err, RegistryError::AbstractInstantiation { id: "db".into() });
}

#[test]
fn test_inner_objects_resolve_by_synthesized_id() {
    let objects = XmlConfig::new([Source::inline(
        "objects.xml",
        r#"<objects xmlns="http://www.springframework.org/springpython/schema/objects">
             <object id="app" class="shop.App">
               <property name="pool"><object class="shop.Pool"/></property>
             </object>
           </objects>"#,
    )])
    .read_definitions()
    .expect("Should read");

    let registry = CountingRegistry::new(&["app.pool.<anonymous>"]);
    let pool = objects[1].property("pool").unwrap().resolve(&registry).unwrap();
    assert_eq!(object(&pool), "app.pool.<anonymous>");
}

#[test]
fn test_programmatic_factories_run_against_registry() {
    let mut config = ProgrammaticConfig::new()
        .declare(ObjectDeclaration::new("greeting", |registry: &dyn Registry| {
            let name = registry.get_object("name")?;
            let name = name
                .downcast_ref::<String>()
                .ok_or_else(|| RegistryError::factory("greeting", "name is not a string"))?;
            Ok(Arc::new(format!("hello {}", name)) as Instance)
        }))
        .declare(ObjectDeclaration::derived(
            "loud",
            "greeting",
            |_: &dyn Registry, parent: Instance| {
                let text = parent
                    .downcast_ref::<String>()
                    .ok_or_else(|| RegistryError::factory("loud", "parent is not a string"))?;
                Ok(Arc::new(text.to_uppercase()) as Instance)
            },
        ));

    let objects = config.read_definitions().expect("Should read");
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[1].parent.as_deref(), Some("greeting"));

    let mut registry = StaticRegistry::new();
    registry.insert("name", Arc::new("world".to_string()));

    let Factory::Programmatic(greeting) = &objects[0].factory else {
        panic!("expected a programmatic factory");
    };
    let hello = greeting.invoke(&registry).unwrap();
    assert_eq!(hello.downcast_ref::<String>().unwrap(), "hello world");

    registry.insert_abstract("greeting", hello);
    let Factory::Programmatic(loud) = &objects[1].factory else {
        panic!("expected a programmatic factory");
    };
    let shout = loud.invoke(&registry).unwrap();
    assert_eq!(shout.downcast_ref::<String>().unwrap(), "HELLO WORLD");
}
