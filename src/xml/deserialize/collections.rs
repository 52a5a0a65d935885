//! Lists, sets and maps.
//!
//! Wrapped collections sit in one element named after the field, each item
//! tagged with the field's item tag. Unwrapped items repeat directly inside
//! the owning element. Maps are either inline (`<key>value</key>`) or
//! exploded into `<key>`/`<value>` pairs inside each entry element.

use indexmap::IndexMap;

use crate::core::EntityId;
use crate::location::{EntryKey, Location};
use crate::model::{Entity, Value};
use crate::schema::{ItemType, MapEncoding, ScalarType, XmlField};
use crate::xml::deserialize::Deserializer;
use crate::xml::deserialize::dom;
use crate::xml::deserialize::helpers::{Target, coerce};
use crate::xml::errors::ParseError;
use crate::xml::quick::Token;

fn empty_collection(set: bool) -> Value {
    if set {
        Value::Set(Vec::new())
    } else {
        Value::List(Vec::new())
    }
}

impl Deserializer<'_, '_> {
    /// Read a wrapper element and every item inside it.
    pub(super) fn read_wrapped(
        &mut self,
        entity: &mut Entity,
        field: &XmlField,
        item: &ItemType,
        set: bool,
    ) -> Result<(), ParseError> {
        let id = entity.id();
        let external = matches!(item, ItemType::Scalar(_));
        if external {
            self.record_field(id, field.name(), self.tokenizer.location());
        }

        let mut collection = empty_collection(set);
        while self.tokenizer.next_tag(self.strict)? == Token::StartTag {
            if self.tokenizer.name() != field.item_tag {
                let tag = self.tokenizer.name().to_string();
                self.unknown_element(&tag)?;
                continue;
            }
            let location = self.tokenizer.location();
            let value = self.read_item(field, item)?;
            let member = set.then(|| value.scalar_text()).flatten();
            if let Some(position) = push_new(&mut collection, value) {
                if external {
                    self.record_entry(id, field.name(), entry_key(member, position), location);
                }
            }
        }

        entity.set(field.name(), collection);
        Ok(())
    }

    /// Read one repeating item; the collection appears with its first item.
    pub(super) fn read_unwrapped_item(
        &mut self,
        entity: &mut Entity,
        field: &XmlField,
        item: &ItemType,
        set: bool,
    ) -> Result<(), ParseError> {
        let id = entity.id();
        let location = self.tokenizer.location();
        let value = self.read_item(field, item)?;
        let member = set.then(|| value.scalar_text()).flatten();
        let collection = entity.get_or_insert_with(field.name(), || empty_collection(set));
        let position = push_new(collection, value);

        if matches!(item, ItemType::Scalar(_)) {
            self.record_field(id, field.name(), location.clone());
            if let Some(position) = position {
                self.record_entry(id, field.name(), entry_key(member, position), location);
            }
        }
        Ok(())
    }

    fn read_item(&mut self, field: &XmlField, item: &ItemType) -> Result<Value, ParseError> {
        match item {
            ItemType::Class(class) => Ok(Value::Entity(Box::new(self.parse_entity(class, false)?))),
            ItemType::Scalar(ScalarType::Dom) => {
                Ok(Value::Dom(dom::build_node(&mut self.tokenizer)?))
            }
            ItemType::Scalar(ty) => {
                let location = self.tokenizer.location();
                let text = self.tokenizer.next_text()?;
                coerce(*ty, &text, &Target::of(&field.descriptor), self.strict, &location)
            }
        }
    }

    pub(super) fn read_map(
        &mut self,
        entity: &mut Entity,
        field: &XmlField,
        encoding: MapEncoding,
    ) -> Result<(), ParseError> {
        let id = entity.id();
        self.record_field(id, field.name(), self.tokenizer.location());

        let trim = field.descriptor.trim;
        let mut map = IndexMap::new();
        while self.tokenizer.next_tag(self.strict)? == Token::StartTag {
            let mut location = self.tokenizer.location();
            let (key, value) = match encoding {
                MapEncoding::Inline => {
                    let key = self.tokenizer.name().to_string();
                    let text = self.tokenizer.next_text()?;
                    (key, trimmed(text, trim))
                }
                MapEncoding::Explode if self.tokenizer.name() == field.item_tag => {
                    let (key, value, value_location) = self.read_map_entry(trim)?;
                    if let Some(value_location) = value_location {
                        location = value_location;
                    }
                    (key, value)
                }
                MapEncoding::Explode => {
                    let tag = self.tokenizer.name().to_string();
                    self.unknown_element(&tag)?;
                    continue;
                }
            };
            self.record_entry(id, field.name(), EntryKey::Key(key.clone()), location);
            map.insert(key, value);
        }

        entity.set(field.name(), Value::Map(map));
        Ok(())
    }

    /// One exploded entry, with the position of its `<value>` tag if any.
    /// Children other than `key` and `value` are dropped.
    fn read_map_entry(
        &mut self,
        trim: bool,
    ) -> Result<(String, String, Option<Location>), ParseError> {
        let mut key = None;
        let mut value = None;
        let mut value_location = None;
        while self.tokenizer.next_tag(self.strict)? == Token::StartTag {
            let is_key = self.tokenizer.name() == "key";
            let is_value = self.tokenizer.name() == "value";
            if is_key {
                key = Some(self.tokenizer.next_text()?);
            } else if is_value {
                value_location = Some(self.tokenizer.location());
                value = Some(trimmed(self.tokenizer.next_text()?, trim));
            } else {
                self.tokenizer.skip_element()?;
            }
        }
        Ok((key.unwrap_or_default(), value.unwrap_or_default(), value_location))
    }

    fn record_entry(&mut self, id: EntityId, field: &str, key: EntryKey, location: Location) {
        if let Some(locations) = self.locations.as_mut() {
            locations.set_entry(id, field, key, location);
        }
    }
}

/// Sets key entries by member text; lists, and members with no text
/// form, by position.
fn entry_key(member: Option<String>, position: usize) -> EntryKey {
    member.map_or(EntryKey::Index(position), EntryKey::Member)
}

/// Add `value` and return its position, or `None` when a set already
/// holds an equal member.
fn push_new(collection: &mut Value, value: Value) -> Option<usize> {
    let before = collection.as_items().map_or(0, <[Value]>::len);
    let position = collection.push_item(value)?;
    (position >= before).then_some(position)
}

fn trimmed(text: String, trim: bool) -> String {
    if trim { text.trim().to_string() } else { text }
}
