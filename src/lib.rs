pub mod core;
pub mod location;
pub mod model;
pub mod schema;
pub mod xml;

pub use crate::core::EntityId;
pub use crate::location::{EntryKey, InputSource, Location, LocationMap};
pub use crate::model::{Entity, ObjectGraph, Value, XmlNode};
pub use crate::schema::{
    ClassDescriptor, FieldDescriptor, FieldKind, ItemType, MapEncoding, NamingConvention,
    ScalarType, Schema, SchemaBuilder, SchemaError,
};
pub use crate::xml::{ParseError, ReaderOptions, SchemaReader};
