//! Build-time checks of a schema.

use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;

use crate::schema::{ClassDescriptor, ClassLayout, FieldKind, ItemType, ScalarType};

/// A schema that cannot be read with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("No root class declared")]
    NoRoot,
    #[error("Multiple root classes declared: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),
    #[error("Root class '{0}' is abstract")]
    AbstractRoot(String),
    #[error("Class '{0}' is declared twice")]
    DuplicateClass(String),
    #[error("Unknown class '{0}'")]
    UnknownClass(String),
    #[error("Class '{class}' extends unknown class '{superclass}'")]
    UnknownSuperclass { class: String, superclass: String },
    #[error("Inheritance cycle: {}", .0.iter().join(" -> "))]
    InheritanceCycle(Vec<String>),
    #[error("Field '{class}.{field}' refers to unknown class '{target}'")]
    UnknownTarget {
        class: String,
        field: String,
        target: String,
    },
    #[error("Class '{0}' declares more than one content field")]
    MultipleContentFields(String),
    #[error("Field '{class}.{field}' must be a textual scalar to be an attribute or content")]
    NotTextual { class: String, field: String },
    #[error("Tracker class '{0}' is not declared")]
    UnknownTracker(String),
}

/// The single root class, which must exist and be concrete.
pub(crate) fn validate_root(
    classes: &IndexMap<String, ClassDescriptor>,
    mut roots: Vec<String>,
) -> Result<String, SchemaError> {
    let root = match roots.len() {
        0 => return Err(SchemaError::NoRoot),
        1 => roots.remove(0),
        _ => return Err(SchemaError::MultipleRoots(roots)),
    };

    match classes.get(&root) {
        None => Err(SchemaError::UnknownClass(root)),
        Some(class) if class.is_abstract => Err(SchemaError::AbstractRoot(root)),
        Some(_) => Ok(root),
    }
}

/// Ancestors of `class` followed by `class` itself, root-most first.
pub(crate) fn inheritance_chain<'c>(
    classes: &'c IndexMap<String, ClassDescriptor>,
    class: &'c ClassDescriptor,
) -> Result<Vec<&'c ClassDescriptor>, SchemaError> {
    let mut chain = vec![class];
    let mut current = class;
    while let Some(parent) = &current.superclass {
        let next = classes
            .get(parent)
            .ok_or_else(|| SchemaError::UnknownSuperclass {
                class: current.name.clone(),
                superclass: parent.clone(),
            })?;
        if chain.iter().any(|c| c.name == next.name) {
            let mut cycle: Vec<String> = chain.iter().map(|c| c.name.clone()).collect();
            cycle.push(next.name.clone());
            return Err(SchemaError::InheritanceCycle(cycle));
        }
        chain.push(next);
        current = next;
    }
    chain.reverse();
    Ok(chain)
}

/// Per-class field checks on a resolved layout.
pub(crate) fn validate_layout(
    classes: &IndexMap<String, ClassDescriptor>,
    class: &ClassDescriptor,
    layout: &ClassLayout,
) -> Result<(), SchemaError> {
    let content_fields = layout
        .fields
        .iter()
        .filter(|f| f.descriptor.content)
        .count();
    if content_fields > 1 {
        return Err(SchemaError::MultipleContentFields(class.name.clone()));
    }

    for field in &layout.fields {
        let descriptor = &field.descriptor;

        if descriptor.attribute || descriptor.content {
            let textual = descriptor.scalar_type().is_some_and(|ty| ty.is_textual());
            // A Dom content field captures the entity's own element.
            let dom_content = descriptor.content
                && !descriptor.attribute
                && descriptor.scalar_type() == Some(ScalarType::Dom);
            if !textual && !dom_content {
                return Err(SchemaError::NotTextual {
                    class: class.name.clone(),
                    field: descriptor.name.clone(),
                });
            }
        }

        let target = match &descriptor.kind {
            FieldKind::One { target } => Some(target),
            FieldKind::List {
                item: ItemType::Class(target),
                ..
            }
            | FieldKind::Set {
                item: ItemType::Class(target),
                ..
            } => Some(target),
            _ => None,
        };
        if let Some(target) = target {
            if !classes.contains_key(target) {
                return Err(SchemaError::UnknownTarget {
                    class: class.name.clone(),
                    field: descriptor.name.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    Ok(())
}
