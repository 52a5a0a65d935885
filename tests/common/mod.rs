//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::fmt::Write;

use quick_xml::escape::escape;
use xbind::model::{Entity, Value};
use xbind::schema::{
    ClassDescriptor, FieldDescriptor, FieldKind, ItemType, MapEncoding, ScalarType, Schema,
    SchemaBuilder, XmlField,
};
use xbind::xml::deserialize::helpers::DEFAULT_DATE_FORMAT;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A cut-down project descriptor: inheritance, nested entities, wrapped
/// lists of entities and strings, a set, an inline map and a free-form
/// configuration tree.
pub fn pom_builder() -> SchemaBuilder {
    Schema::builder()
        .class(
            ClassDescriptor::new("ModelBase")
                .abstract_class()
                .field(FieldDescriptor::list(
                    "modules",
                    ItemType::Scalar(ScalarType::String),
                ))
                .field(FieldDescriptor::map("properties", MapEncoding::Inline)),
        )
        .class(
            ClassDescriptor::new("Model")
                .extends("ModelBase")
                .tag_name("project")
                .field(
                    FieldDescriptor::scalar("childProjectUrlInheritAppendPath", ScalarType::String)
                        .attribute()
                        .tag_name("child.project.url.inherit.append.path"),
                )
                .field(FieldDescriptor::scalar("modelVersion", ScalarType::String))
                .field(FieldDescriptor::one("parent", "Parent"))
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(FieldDescriptor::scalar("packaging", ScalarType::String).default_value("jar"))
                .field(FieldDescriptor::scalar("inceptionYear", ScalarType::Int))
                .field(FieldDescriptor::list("developers", ItemType::class("Developer")))
                .field(FieldDescriptor::list("dependencies", ItemType::class("Dependency")))
                .field(FieldDescriptor::one("build", "Build")),
        )
        .class(
            ClassDescriptor::new("Parent")
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(
                    FieldDescriptor::scalar("relativePath", ScalarType::String)
                        .default_value("../pom.xml"),
                ),
        )
        .class(
            ClassDescriptor::new("Developer")
                .field(FieldDescriptor::scalar("id", ScalarType::String))
                .field(FieldDescriptor::scalar("name", ScalarType::String))
                .field(FieldDescriptor::scalar("email", ScalarType::String))
                .field(FieldDescriptor::set("roles", ItemType::Scalar(ScalarType::String)))
                .field(FieldDescriptor::scalar("timezone", ScalarType::String)),
        )
        .class(
            ClassDescriptor::new("Dependency")
                .standalone()
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(FieldDescriptor::scalar("type", ScalarType::String).default_value("jar"))
                .field(FieldDescriptor::scalar("scope", ScalarType::String))
                .field(FieldDescriptor::scalar("optional", ScalarType::Boolean))
                .field(FieldDescriptor::list("exclusions", ItemType::class("Exclusion"))),
        )
        .class(
            ClassDescriptor::new("Exclusion")
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String)),
        )
        .class(
            ClassDescriptor::new("Build")
                .field(FieldDescriptor::scalar("finalName", ScalarType::String))
                .field(FieldDescriptor::list("plugins", ItemType::class("Plugin"))),
        )
        .class(
            ClassDescriptor::new("Plugin")
                .field(
                    FieldDescriptor::scalar("groupId", ScalarType::String)
                        .default_value("org.apache.maven.plugins"),
                )
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(FieldDescriptor::scalar("extensions", ScalarType::Boolean))
                .field(FieldDescriptor::list("goals", ItemType::Scalar(ScalarType::String)))
                .field(FieldDescriptor::scalar("configuration", ScalarType::Dom)),
        )
        .class(ClassDescriptor::new("InputLocation"))
        .class(ClassDescriptor::new("InputSource"))
        .root("Model")
}

pub fn pom_schema() -> Schema {
    pom_builder().build().expect("pom schema is valid")
}

/// The project schema with location and source tracking switched on.
pub fn tracked_pom_schema() -> Schema {
    pom_builder()
        .location_tracker("InputLocation")
        .source_tracker("InputSource")
        .build()
        .expect("tracked pom schema is valid")
}

pub const SAMPLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd"
         child.project.url.inherit.append.path="false">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>example-parent</artifactId>
    <version>3</version>
  </parent>
  <artifactId>widget</artifactId>
  <version>1.2.0-SNAPSHOT</version>
  <inceptionYear>2009</inceptionYear>
  <modules>
    <module>core</module>
    <module>cli</module>
  </modules>
  <properties>
    <java.version>17</java.version>
    <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
  </properties>
  <developers>
    <developer>
      <id>ann</id>
      <name>Ann Example</name>
      <roles>
        <role>lead</role>
        <role>committer</role>
        <role>lead</role>
      </roles>
    </developer>
  </developers>
  <dependencies>
    <dependency>
      <groupId>org.junit.jupiter</groupId>
      <artifactId>junit-jupiter</artifactId>
      <version>5.10.0</version>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>legacy</artifactId>
      <version>0.9</version>
      <optional>TRUE</optional>
      <exclusions>
        <exclusion>
          <groupId>log4j</groupId>
          <artifactId>log4j</artifactId>
        </exclusion>
      </exclusions>
    </dependency>
  </dependencies>
  <build>
    <finalName>widget</finalName>
    <plugins>
      <plugin>
        <artifactId>maven-compiler-plugin</artifactId>
        <version>3.11.0</version>
        <configuration>
          <release>17</release>
          <compilerArgs>
            <arg>-Xlint:all</arg>
          </compilerArgs>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>
"#;

/// Render `entity` as a document the reader accepts in strict mode.
pub fn render(schema: &Schema, entity: &Entity) -> String {
    let layout = schema.layout(entity.class()).expect("class has a layout");
    let mut out = String::new();
    write_entity(schema, entity, &layout.tag, &mut out);
    out
}

fn write_entity(schema: &Schema, entity: &Entity, tag: &str, out: &mut String) {
    let layout = schema.layout(entity.class()).expect("class has a layout");
    write!(out, "<{}", tag).unwrap();
    for field in layout.attribute_fields() {
        if let Some(value) = entity.get(field.name()) {
            write!(out, " {}=\"{}\"", field.tag, escape(&scalar_text(value))).unwrap();
        }
    }
    out.push('>');

    if let Some(content) = layout.content_field() {
        if let Some(value) = entity.get(content.name()) {
            out.push_str(&escape(&scalar_text(value)));
        }
    } else {
        for field in layout.element_fields() {
            if let Some(value) = entity.get(field.name()) {
                write_field(schema, field, value, out);
            }
        }
    }
    write!(out, "</{}>", tag).unwrap();
}

fn write_field(schema: &Schema, field: &XmlField, value: &Value, out: &mut String) {
    match (&field.descriptor.kind, value) {
        (FieldKind::Scalar(_), value) => write_text_element(out, &field.tag, &scalar_text(value)),
        (FieldKind::One { .. }, Value::Entity(entity)) => {
            write_entity(schema, entity, &field.tag, out)
        }
        (
            FieldKind::List { wrapped, .. } | FieldKind::Set { wrapped, .. },
            Value::List(items) | Value::Set(items),
        ) => {
            if *wrapped {
                write!(out, "<{}>", field.tag).unwrap();
            }
            for item in items {
                match item {
                    Value::Entity(entity) => write_entity(schema, entity, &field.item_tag, out),
                    other => write_text_element(out, &field.item_tag, &scalar_text(other)),
                }
            }
            if *wrapped {
                write!(out, "</{}>", field.tag).unwrap();
            }
        }
        (FieldKind::Map { encoding }, Value::Map(map)) => {
            write!(out, "<{}>", field.tag).unwrap();
            for (key, value) in map {
                match encoding {
                    MapEncoding::Inline => write_text_element(out, key, value),
                    MapEncoding::Explode => {
                        write!(out, "<{}>", field.item_tag).unwrap();
                        write_text_element(out, "key", key);
                        write_text_element(out, "value", value);
                        write!(out, "</{}>", field.item_tag).unwrap();
                    }
                }
            }
            write!(out, "</{}>", field.tag).unwrap();
        }
        (kind, value) => panic!("cannot render {value:?} as {kind:?}"),
    }
}

fn write_text_element(out: &mut String, tag: &str, text: &str) {
    write!(out, "<{}>{}</{}>", tag, escape(text), tag).unwrap();
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.format(DEFAULT_DATE_FORMAT).to_string(),
        other => panic!("{other:?} is not a scalar"),
    }
}
