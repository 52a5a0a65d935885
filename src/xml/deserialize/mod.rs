//! Schema-driven XML deserialization.
//!
//! One recursive-descent parser serves every class of a [`Schema`]: it reads
//! the attributes of an entity's start tag, then dispatches each child
//! element to the first field whose tag matches, recursing for nested
//! entities and delegating lists, sets and maps to the collection reader.

mod collections;
mod dom;
pub mod helpers;
mod tracking;

use crate::core::EntityId;
use crate::location::{Location, LocationMap};
use crate::model::{Entity, Value};
use crate::schema::{ClassLayout, FieldKind, ScalarType, Schema, XmlField};
use crate::xml::errors::ParseError;
use crate::xml::quick::{Token, Tokenizer};

use helpers::{Target, coerce};
use tracking::{ParsedTags, check_unknown_attribute};

/// Reads one document against a schema.
pub struct Deserializer<'s, 'x> {
    schema: &'s Schema,
    tokenizer: Tokenizer<'x>,
    strict: bool,
    next_id: EntityId,
    locations: Option<LocationMap>,
}

impl<'s, 'x> Deserializer<'s, 'x> {
    pub fn new(schema: &'s Schema, tokenizer: Tokenizer<'x>, strict: bool) -> Self {
        Self {
            schema,
            tokenizer,
            strict,
            next_id: EntityId::default(),
            locations: schema.tracks_locations().then(LocationMap::new),
        }
    }

    /// Read the document element as an entity of `class`.
    ///
    /// Reading stops at the end tag of the document element; anything after
    /// it is left unread.
    pub fn read_root(&mut self, class: &str) -> Result<Entity, ParseError> {
        let schema = self.schema;
        let layout = schema
            .layout(class)
            .ok_or_else(|| ParseError::UnknownClass(class.to_string()))?;

        loop {
            match self.tokenizer.next()? {
                Token::StartTag => break,
                Token::EndDocument => {
                    return Err(ParseError::MalformedDocument {
                        expected: layout.tag.clone(),
                        location: self.tokenizer.location(),
                    });
                }
                Token::Text | Token::EndTag => {}
            }
        }

        if self.strict && self.tokenizer.name() != layout.tag {
            return Err(ParseError::UnexpectedRootTag {
                expected: layout.tag.clone(),
                found: self.tokenizer.name().to_string(),
                location: self.tokenizer.location(),
            });
        }
        self.parse_entity(class, true)
    }

    /// Encoding named by the document and the locations collected so far.
    pub fn into_parts(self) -> (String, Option<LocationMap>) {
        (self.tokenizer.encoding().to_string(), self.locations)
    }

    /// Parse the entity whose start tag is current, through its end tag.
    pub(crate) fn parse_entity(
        &mut self,
        class: &str,
        document_element: bool,
    ) -> Result<Entity, ParseError> {
        let schema = self.schema;
        let descriptor = schema
            .class(class)
            .ok_or_else(|| ParseError::UnknownClass(class.to_string()))?;
        if descriptor.is_abstract {
            return Err(ParseError::AbstractClass(class.to_string()));
        }
        let layout = schema
            .layout(class)
            .ok_or_else(|| ParseError::UnknownClass(class.to_string()))?;

        let tag = self.tokenizer.name().to_string();
        let start = self.tokenizer.location();
        log::debug!("Parsing <{}> as {} at {}", tag, class, start);

        let mut entity = Entity::new(self.allocate_id(), class);
        self.apply_defaults(&mut entity, layout, &start)?;
        if let Some(locations) = self.locations.as_mut() {
            locations.set_entity(entity.id(), start.clone());
        }
        self.read_attributes(&mut entity, layout, &tag, document_element, &start)?;

        if let Some(content) = layout.content_field() {
            self.read_content(&mut entity, content, &start)?;
        } else {
            let mut parsed = ParsedTags::new();
            while self.tokenizer.next_tag(self.strict)? == Token::StartTag {
                self.dispatch(&mut entity, layout, &mut parsed)?;
            }
        }

        log::debug!("Finished <{}> ({} fields)", tag, entity.fields().count());
        Ok(entity)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    fn apply_defaults(
        &self,
        entity: &mut Entity,
        layout: &ClassLayout,
        start: &Location,
    ) -> Result<(), ParseError> {
        for field in &layout.fields {
            let descriptor = &field.descriptor;
            let (Some(default), Some(ty)) = (&descriptor.default, descriptor.scalar_type()) else {
                continue;
            };
            if ty == ScalarType::Dom {
                continue;
            }
            let value = coerce(ty, default, &Target::of(descriptor), false, start)?;
            entity.set(field.name(), value);
        }
        Ok(())
    }

    fn read_attributes(
        &mut self,
        entity: &mut Entity,
        layout: &ClassLayout,
        tag: &str,
        document_element: bool,
        start: &Location,
    ) -> Result<(), ParseError> {
        let attributes = self.tokenizer.attributes().to_vec();
        for (name, raw) in &attributes {
            if name.contains(':') || (document_element && name == "xmlns") {
                continue;
            }
            let Some(field) = layout.attribute_field(name) else {
                check_unknown_attribute(
                    name,
                    tag,
                    self.strict,
                    self.schema.strict_attributes(),
                    || start.clone(),
                )?;
                continue;
            };
            let Some(ty) = field.descriptor.scalar_type() else {
                continue;
            };
            let value = coerce(ty, raw, &Target::of(&field.descriptor), self.strict, start)?;
            entity.set(field.name(), value);
            self.record_field(entity.id(), field.name(), start.clone());
        }

        if self.strict {
            let missing = layout
                .attribute_fields()
                .filter(|f| f.descriptor.required)
                .find(|f| !attributes.iter().any(|(name, _)| *name == f.tag));
            if let Some(field) = missing {
                return Err(ParseError::MissingRequiredAttribute {
                    attribute: field.tag.clone(),
                    tag: tag.to_string(),
                    location: start.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fill the content field from the entity's own text, or its whole
    /// element when the field is a tree.
    fn read_content(
        &mut self,
        entity: &mut Entity,
        field: &XmlField,
        start: &Location,
    ) -> Result<(), ParseError> {
        let value = match field.descriptor.scalar_type() {
            Some(ScalarType::Dom) => Value::Dom(dom::build_node(&mut self.tokenizer)?),
            Some(ty) => {
                let text = self.tokenizer.next_text()?;
                coerce(ty, &text, &Target::of(&field.descriptor), self.strict, start)?
            }
            None => return self.tokenizer.skip_element(),
        };
        entity.set(field.name(), value);
        self.record_field(entity.id(), field.name(), start.clone());
        Ok(())
    }

    /// Route the current child start tag to the first matching field.
    fn dispatch(
        &mut self,
        entity: &mut Entity,
        layout: &ClassLayout,
        parsed: &mut ParsedTags,
    ) -> Result<(), ParseError> {
        let current = self.tokenizer.name().to_string();
        for field in layout.element_fields() {
            let matched = match &field.descriptor.kind {
                FieldKind::List { wrapped: false, .. } | FieldKind::Set { wrapped: false, .. } => {
                    current == field.item_tag
                }
                _ => parsed.check_field_with_duplicate(&current, &field.tag, field.alias(), || {
                    self.tokenizer.location()
                })?,
            };
            if matched {
                log::trace!("<{}> -> {}.{}", current, entity.class(), field.name());
                return self.read_field(entity, field);
            }
        }
        self.unknown_element(&current)
    }

    fn read_field(&mut self, entity: &mut Entity, field: &XmlField) -> Result<(), ParseError> {
        let descriptor = &field.descriptor;
        match &descriptor.kind {
            FieldKind::Scalar(ScalarType::Dom) => {
                let location = self.tokenizer.location();
                let node = dom::build_node(&mut self.tokenizer)?;
                entity.set(field.name(), Value::Dom(node));
                self.record_field(entity.id(), field.name(), location);
            }
            FieldKind::Scalar(ty) => {
                let location = self.tokenizer.location();
                let text = self.tokenizer.next_text()?;
                let value = coerce(*ty, &text, &Target::of(descriptor), self.strict, &location)?;
                entity.set(field.name(), value);
                self.record_field(entity.id(), field.name(), location);
            }
            FieldKind::One { target } => {
                let child = self.parse_entity(target, false)?;
                entity.set(field.name(), Value::Entity(Box::new(child)));
            }
            FieldKind::List { item, wrapped } => {
                if *wrapped {
                    self.read_wrapped(entity, field, item, false)?;
                } else {
                    self.read_unwrapped_item(entity, field, item, false)?;
                }
            }
            FieldKind::Set { item, wrapped } => {
                if *wrapped {
                    self.read_wrapped(entity, field, item, true)?;
                } else {
                    self.read_unwrapped_item(entity, field, item, true)?;
                }
            }
            FieldKind::Map { encoding } => self.read_map(entity, field, *encoding)?,
        }
        Ok(())
    }

    /// An element no field claims: an error in strict mode, skipped otherwise.
    fn unknown_element(&mut self, tag: &str) -> Result<(), ParseError> {
        let location = self.tokenizer.location();
        if self.strict {
            return Err(ParseError::UnknownElement {
                tag: tag.to_string(),
                location,
            });
        }
        log::warn!("Skipping unrecognised tag '{}' at {}", tag, location);
        self.tokenizer.skip_element()
    }

    fn record_field(&mut self, id: EntityId, field: &str, location: Location) {
        if let Some(locations) = self.locations.as_mut() {
            locations.set_field(id, field, location);
        }
    }
}
