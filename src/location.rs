//! Source locations and the side-channel that maps graph nodes to them.
//!
//! Locations are not stored on entities. A [`LocationMap`] is filled during a
//! read when the schema names a location tracker, keyed by entity id, by
//! (entity, field) and by (entity, field, entry).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::EntityId;

/// Caller-supplied provenance attached to every location of one read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InputSource {
    /// Identifier of the model being read, e.g. `groupId:artifactId:version`.
    pub model_id: Option<String>,
    /// Where the document came from, e.g. a file path.
    pub location: Option<String>,
}

impl InputSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A position in the input: 1-based line, 1-based column in characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub source: Option<Arc<InputSource>>,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<Arc<InputSource>>) -> Self {
        self.source = source;
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if let Some(path) = self.source.as_ref().and_then(|s| s.location.as_ref()) {
            write!(f, " in '{}'", path)?;
        }
        Ok(())
    }
}

/// Key of one collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    /// Position in a list.
    Index(usize),
    /// Text of a set member, as given by [`crate::model::Value::scalar_text`].
    Member(String),
    /// Map key.
    Key(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct FieldLocations {
    location: Option<Location>,
    entries: HashMap<EntryKey, Location>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct EntityLocations {
    location: Option<Location>,
    fields: HashMap<String, FieldLocations>,
}

/// Locations of the entities, fields and collection entries of one graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationMap {
    entities: HashMap<EntityId, EntityLocations>,
}

impl LocationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tag of the entity.
    pub fn entity(&self, id: EntityId) -> Option<&Location> {
        self.entities.get(&id)?.location.as_ref()
    }

    /// Where `field` of the entity was read: its element, its attribute's
    /// owning element, or the wrapper/first item of a collection.
    pub fn field(&self, id: EntityId, field: &str) -> Option<&Location> {
        self.entities.get(&id)?.fields.get(field)?.location.as_ref()
    }

    /// Start tag of one collection entry.
    pub fn entry(&self, id: EntityId, field: &str, key: &EntryKey) -> Option<&Location> {
        self.entities.get(&id)?.fields.get(field)?.entries.get(key)
    }

    /// Number of entities with a recorded location.
    pub fn entity_count(&self) -> usize {
        self.entities
            .values()
            .filter(|e| e.location.is_some())
            .count()
    }

    pub(crate) fn set_entity(&mut self, id: EntityId, location: Location) {
        self.entities.entry(id).or_default().location = Some(location);
    }

    /// Record the field location unless one is already there.
    pub(crate) fn set_field(&mut self, id: EntityId, field: &str, location: Location) {
        let entry = self.field_entry(id, field);
        if entry.location.is_none() {
            entry.location = Some(location);
        }
    }

    pub(crate) fn set_entry(&mut self, id: EntityId, field: &str, key: EntryKey, location: Location) {
        self.field_entry(id, field).entries.insert(key, location);
    }

    fn field_entry(&mut self, id: EntityId, field: &str) -> &mut FieldLocations {
        self.entities
            .entry(id)
            .or_default()
            .fields
            .entry(field.to_string())
            .or_default()
    }
}
