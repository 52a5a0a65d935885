//! Performance benchmarks for schema-driven XML reading.
//!
//! Measures a small and a generated large project document, with and
//! without location tracking, and the large document minified onto a
//! single line.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xbind::schema::{ClassDescriptor, FieldDescriptor, ItemType, MapEncoding, ScalarType, Schema};
use xbind::xml::SchemaReader;

fn schema(tracked: bool) -> Schema {
    let mut builder = Schema::builder()
        .class(
            ClassDescriptor::new("Project")
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(FieldDescriptor::map("properties", MapEncoding::Inline))
                .field(FieldDescriptor::list("dependencies", ItemType::class("Dependency"))),
        )
        .class(
            ClassDescriptor::new("Dependency")
                .field(FieldDescriptor::scalar("groupId", ScalarType::String))
                .field(FieldDescriptor::scalar("artifactId", ScalarType::String))
                .field(FieldDescriptor::scalar("version", ScalarType::String))
                .field(FieldDescriptor::scalar("optional", ScalarType::Boolean))
                .field(FieldDescriptor::list(
                    "classifiers",
                    ItemType::Scalar(ScalarType::String),
                )),
        )
        .class(ClassDescriptor::new("InputLocation"))
        .root("Project");
    if tracked {
        builder = builder.location_tracker("InputLocation");
    }
    builder.build().expect("benchmark schema is valid")
}

fn project_xml(dependencies: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
    <groupId>org.example</groupId>
    <artifactId>bench</artifactId>
    <version>1.0.0</version>
    <properties>
        <java.version>17</java.version>
        <encoding>UTF-8</encoding>
    </properties>
    <dependencies>
"#,
    );
    for i in 0..dependencies {
        xml.push_str(&format!(
            r#"        <dependency>
            <groupId>org.example.group{i}</groupId>
            <artifactId>artifact-{i}</artifactId>
            <version>{i}.0</version>
            <optional>{}</optional>
            <classifiers><classifier>sources</classifier><classifier>javadoc</classifier></classifiers>
        </dependency>
"#,
            i % 2 == 0
        ));
    }
    xml.push_str("    </dependencies>\n</project>\n");
    xml
}

fn bench_parse_simple(c: &mut Criterion) {
    let schema = schema(false);
    let reader = SchemaReader::new(&schema);
    let xml = project_xml(2);

    c.bench_function("parse_simple", |b| b.iter(|| reader.read_str(black_box(&xml))));
}

fn bench_parse_large(c: &mut Criterion) {
    let schema = schema(false);
    let reader = SchemaReader::new(&schema);
    let xml = project_xml(500);

    c.bench_function("parse_large", |b| b.iter(|| reader.read_str(black_box(&xml))));
}

fn bench_parse_single_line(c: &mut Criterion) {
    let schema = schema(false);
    let reader = SchemaReader::new(&schema);
    let xml: String = project_xml(500)
        .lines()
        .map(str::trim)
        .collect();

    c.bench_function("parse_single_line", |b| {
        b.iter(|| reader.read_str(black_box(&xml)))
    });
}

fn bench_parse_large_tracked(c: &mut Criterion) {
    let schema = schema(true);
    let reader = SchemaReader::new(&schema);
    let xml = project_xml(500);

    c.bench_function("parse_large_tracked", |b| {
        b.iter(|| reader.read_str(black_box(&xml)))
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_large,
    bench_parse_single_line,
    bench_parse_large_tracked
);
criterion_main!(benches);
