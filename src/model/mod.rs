//! The object graph produced by a read.

pub mod dom;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::core::EntityId;
use crate::location::LocationMap;

pub use dom::XmlNode;

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(NaiveDateTime),
    Dom(XmlNode),
    Entity(Box<Entity>),
    List(Vec<Value>),
    /// Unique members in first-encounter order.
    Set(Vec<Value>),
    Map(IndexMap<String, String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer value, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Any floating point value, widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Items of a list or a set.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_dom(&self) -> Option<&XmlNode> {
        match self {
            Value::Dom(node) => Some(node),
            _ => None,
        }
    }

    /// Canonical text of a scalar value; `None` for DOM trees, entities
    /// and collections.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Bool(v) => Some(v.to_string()),
            Value::Char(v) => Some(v.to_string()),
            Value::Byte(v) => Some(v.to_string()),
            Value::Short(v) => Some(v.to_string()),
            Value::Int(v) => Some(v.to_string()),
            Value::Long(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Double(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Date(v) => Some(v.to_string()),
            Value::Dom(_) | Value::Entity(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => {
                None
            }
        }
    }

    /// Add `item` to a list or set and return its position. A set returns
    /// the position of an equal member instead of adding a second one.
    pub(crate) fn push_item(&mut self, item: Value) -> Option<usize> {
        match self {
            Value::List(items) => {
                items.push(item);
                Some(items.len() - 1)
            }
            Value::Set(items) => match items.iter().position(|v| *v == item) {
                Some(pos) => Some(pos),
                None => {
                    items.push(item);
                    Some(items.len() - 1)
                }
            },
            _ => None,
        }
    }
}

/// One instance of a schema class.
///
/// Fields keep the order in which they were first set. Equality compares the
/// class and the fields, not the id.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    class: String,
    fields: IndexMap<String, Value>,
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.fields == other.fields
    }
}

impl Entity {
    pub fn new(id: EntityId, class: impl Into<String>) -> Self {
        Self {
            id,
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style [`set`](Self::set), handy for expected values in tests.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// The value of `field`, inserting `init()` first when unset.
    pub(crate) fn get_or_insert_with(
        &mut self,
        field: &str,
        init: impl FnOnce() -> Value,
    ) -> &mut Value {
        match self.fields.entry(field.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(init()),
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn get_entity(&self, field: &str) -> Option<&Entity> {
        self.get(field).and_then(Value::as_entity)
    }

    pub fn get_items(&self, field: &str) -> Option<&[Value]> {
        self.get(field).and_then(Value::as_items)
    }

    pub fn get_map(&self, field: &str) -> Option<&IndexMap<String, String>> {
        self.get(field).and_then(Value::as_map)
    }
}

/// Result of reading one document.
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    pub root: Entity,
    /// Encoding named by the XML declaration, `UTF-8` when absent.
    pub encoding: String,
    /// Present when the schema tracks locations.
    pub locations: Option<LocationMap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::Int(7).scalar_text().as_deref(), Some("7"));
        assert_eq!(Value::Bool(true).scalar_text().as_deref(), Some("true"));
        assert_eq!(Value::String("lead".into()).scalar_text().as_deref(), Some("lead"));
        assert_eq!(Value::List(Vec::new()).scalar_text(), None);
        assert_eq!(Value::Dom(XmlNode::new("cfg")).scalar_text(), None);
    }

    #[test]
    fn test_set_keeps_first_occurrence() {
        let mut set = Value::Set(Vec::new());
        assert_eq!(set.push_item(Value::String("a".into())), Some(0));
        assert_eq!(set.push_item(Value::String("b".into())), Some(1));
        assert_eq!(set.push_item(Value::String("a".into())), Some(0));
        assert_eq!(set.as_items().map(|items| items.len()), Some(2));
    }

    #[test]
    fn test_entity_equality_ignores_id() {
        let a = Entity::new(EntityId::new(1), "Model").with("name", Value::Int(3));
        let b = Entity::new(EntityId::new(7), "Model").with("name", Value::Int(3));
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with("name", Value::Int(4)));
    }

    #[test]
    fn test_widening_getters() {
        let entity = Entity::new(EntityId::default(), "Numbers")
            .with("b", Value::Byte(-3))
            .with("f", Value::Float(1.5));
        assert_eq!(entity.get_i64("b"), Some(-3));
        assert_eq!(entity.get_f64("f"), Some(1.5));
        assert_eq!(entity.get_str("b"), None);
    }
}
