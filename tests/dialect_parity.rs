//! The same objects written in each markup and structured-text dialect read
//! into identical definitions

use pretty_assertions::assert_eq;

use objdef::{
    DefinitionReader, LegacyXmlConfig, ObjectDefinition, Source, SpringBeansConfig, XmlConfig,
    YamlConfig,
};

const OBJECTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<objects xmlns="http://www.springframework.org/springpython/schema/objects/1.1">
    <object id="db" class="shop.Database">
        <property name="url" value="sqlite://mem"/>
    </object>
    <object id="service" class="shop.Service" scope="prototype">
        <constructor-arg ref="db"/>
        <constructor-arg><value>fast</value></constructor-arg>
        <property name="tags">
            <list>
                <value>a</value>
                <ref object="db"/>
            </list>
        </property>
        <property name="env">
            <dict>
                <entry><key><value>mode</value></key><value>x</value></entry>
                <entry><key><value>conn</value></key><ref object="db"/></entry>
            </dict>
        </property>
        <property name="pool">
            <object class="shop.Pool">
                <property name="size" value="4"/>
            </object>
        </property>
    </object>
</objects>
"#;

const BEANS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://www.springframework.org/schema/beans">
    <bean id="db" class="shop.Database">
        <property name="url" value="sqlite://mem"/>
    </bean>
    <bean id="service" class="shop.Service" scope="prototype">
        <constructor-arg><ref bean="db"/></constructor-arg>
        <constructor-arg value="fast"/>
        <property name="tags">
            <list>
                <value>a</value>
                <ref bean="db"/>
            </list>
        </property>
        <property name="env">
            <map>
                <entry><key><value>mode</value></key><value>x</value></entry>
                <entry><key><value>conn</value></key><ref bean="db"/></entry>
            </map>
        </property>
        <property name="pool">
            <bean class="shop.Pool">
                <property name="size"><value>4</value></property>
            </bean>
        </property>
    </bean>
</beans>
"#;

const OBJECTS_YAML: &str = r#"
objects:
  - object: db
    class: shop.Database
    properties:
      url: sqlite://mem

  - object: service
    class: shop.Service
    scope: prototype
    constructor-args:
      - {ref: db}
      - fast
    properties:
      tags: [a, {ref: db}]
      env:
        mode: x
        conn: {ref: {object: db}}
      pool:
        class: shop.Pool
        properties:
          size: 4
"#;

fn read(mut reader: impl DefinitionReader) -> Vec<ObjectDefinition> {
    reader.read_definitions().expect("should read")
}

#[test]
fn test_markup_and_structured_text_agree() {
    let objects = read(XmlConfig::new([Source::inline("objects.xml", OBJECTS_XML)]));
    let beans = read(SpringBeansConfig::new([Source::inline("beans.xml", BEANS_XML)]));
    let yaml = read(YamlConfig::new([Source::inline("objects.yaml", OBJECTS_YAML)]));

    assert_eq!(objects, yaml);
    assert_eq!(objects, beans);
}

#[test]
fn test_rendered_definitions() {
    let objects = read(XmlConfig::new([Source::inline("objects.xml", OBJECTS_XML)]));
    let rendered = objects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r###"
    object db (singleton) <- shop.Database
      property url = "sqlite://mem"
    object service.pool.<anonymous> (singleton) <- shop.Pool
      property size = "4"
    object service (prototype) <- shop.Service
      arg[0] = ref(db)
      arg[1] = "fast"
      property tags = ["a", ref(db)]
      property env = {"mode": "x", "conn": ref(db)}
      property pool = object(service.pool.<anonymous>)
    "###);
}

#[test]
fn test_unquoted_scalars_read_as_markup_text() {
    let yaml = read(YamlConfig::new([Source::inline(
        "server.yaml",
        r#"
objects:
  - object: server
    class: net.Server
    constructor-args: [8080, 0.5]
    properties:
      port: 8080
      debug: true
      hosts: [1, two]
      limits: {max: 10}
"#,
    )]));
    let xml = read(XmlConfig::new([Source::inline(
        "server.xml",
        r#"<objects xmlns="http://www.springframework.org/springpython/schema/objects">
             <object id="server" class="net.Server">
               <constructor-arg value="8080"/>
               <constructor-arg value="0.5"/>
               <property name="port" value="8080"/>
               <property name="debug" value="True"/>
               <property name="hosts"><list><value>1</value><value>two</value></list></property>
               <property name="limits"><dict><entry key="max" value="10"/></dict></property>
             </object>
           </objects>"#,
    )]));

    assert_eq!(yaml, xml);
}

#[test]
fn test_legacy_references_match_current_markup() {
    let legacy = read(LegacyXmlConfig::new([Source::inline(
        "legacy.xml",
        r#"<components xmlns="http://www.springframework.org/springpython/schema/pycontainer-components">
             <component id="service" class="shop.Service" scope="prototype">
               <property name="db" local="db"/>
               <property name="peers"><list><local>a</local><local>b</local></list></property>
             </component>
           </components>"#,
    )]));
    let current = read(XmlConfig::new([Source::inline(
        "objects.xml",
        r#"<objects xmlns="http://www.springframework.org/springpython/schema/objects">
             <object id="service" class="shop.Service" scope="prototype">
               <property name="db" ref="db"/>
               <property name="peers"><list><ref object="a"/><ref object="b"/></list></property>
             </object>
           </objects>"#,
    )]));

    assert_eq!(legacy, current);
}

#[test]
fn test_multiple_sources_keep_order() {
    let mut reader = XmlConfig::new([
        Source::inline(
            "first.xml",
            r#"<objects xmlns="http://www.springframework.org/springpython/schema/objects">
                 <object id="a" class="A"/>
               </objects>"#,
        ),
        Source::inline(
            "second.xml",
            r#"<objects xmlns="http://www.springframework.org/springpython/schema/objects/1.1">
                 <object id="b" class="B"/>
                 <object id="c" class="C"/>
               </objects>"#,
        ),
    ]);

    let ids: Vec<_> = reader
        .read_definitions()
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_reading_twice_yields_equal_results() {
    let mut xml = XmlConfig::new([Source::inline("objects.xml", OBJECTS_XML)]);
    let mut yaml = YamlConfig::new([Source::inline("objects.yaml", OBJECTS_YAML)]);
    let mut beans = SpringBeansConfig::new([Source::inline("beans.xml", BEANS_XML)]);

    assert_eq!(xml.read_definitions().unwrap(), xml.read_definitions().unwrap());
    assert_eq!(yaml.read_definitions().unwrap(), yaml.read_definitions().unwrap());
    assert_eq!(beans.read_definitions().unwrap(), beans.read_definitions().unwrap());
}
