//! Reading documents against a schema.
//!
//! [`SchemaReader`] is the entry point: it owns the per-read options and
//! turns a document into an [`ObjectGraph`].
//!
//! ```
//! use xbind::schema::{ClassDescriptor, FieldDescriptor, ScalarType, Schema};
//! use xbind::xml::SchemaReader;
//!
//! let schema = Schema::builder()
//!     .class(
//!         ClassDescriptor::new("Model")
//!             .field(FieldDescriptor::scalar("name", ScalarType::String)),
//!     )
//!     .root("Model")
//!     .build()
//!     .unwrap();
//!
//! let graph = SchemaReader::new(&schema)
//!     .read_str("<model><name>demo</name></model>")
//!     .unwrap();
//! assert_eq!(graph.root.get_str("name"), Some("demo"));
//! ```

pub mod deserialize;
pub mod entities;
pub mod errors;
pub mod quick;

use std::io::Read;
use std::sync::Arc;

use crate::location::InputSource;
use crate::model::ObjectGraph;
use crate::schema::Schema;

pub use deserialize::Deserializer;
pub use errors::ParseError;
pub use quick::{Token, Tokenizer};

/// Per-read settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Unknown elements, stray text, malformed numbers and a mismatched
    /// document element are errors rather than being skipped or defaulted.
    pub strict: bool,
    /// Resolve the XHTML named character references.
    pub add_default_entities: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            strict: true,
            add_default_entities: true,
        }
    }
}

/// Reads documents into object graphs for one schema.
///
/// A reader holds no per-document state; it can be reused and shared.
#[derive(Debug, Clone, Copy)]
pub struct SchemaReader<'s> {
    schema: &'s Schema,
    options: ReaderOptions,
}

impl<'s> SchemaReader<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: ReaderOptions::default(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    pub fn add_default_entities(mut self, add: bool) -> Self {
        self.options.add_default_entities = add;
        self
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    pub fn read_str(&self, xml: &str) -> Result<ObjectGraph, ParseError> {
        self.read_document(self.schema.root().name.as_str(), xml, None)
    }

    /// Like [`read_str`](Self::read_str), attaching `source` to every location
    /// when the schema tracks sources.
    pub fn read_str_with_source(
        &self,
        xml: &str,
        source: InputSource,
    ) -> Result<ObjectGraph, ParseError> {
        self.read_document(self.schema.root().name.as_str(), xml, Some(source))
    }

    /// Read a whole UTF-8 document from `reader`.
    pub fn read<R: Read>(&self, mut reader: R) -> Result<ObjectGraph, ParseError> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        self.read_str(&xml)
    }

    pub fn read_with_source<R: Read>(
        &self,
        mut reader: R,
        source: InputSource,
    ) -> Result<ObjectGraph, ParseError> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        self.read_str_with_source(&xml, source)
    }

    /// Read a document whose element is an instance of `class` rather than
    /// of the root class. Only the root and standalone classes qualify.
    pub fn read_class(&self, class: &str, xml: &str) -> Result<ObjectGraph, ParseError> {
        let descriptor = self
            .schema
            .class(class)
            .ok_or_else(|| ParseError::UnknownClass(class.to_string()))?;
        let is_root = self.schema.root().name == descriptor.name;
        if (!is_root && !descriptor.standalone_read) || self.schema.is_tracking_support(class) {
            return Err(ParseError::NotStandalone(class.to_string()));
        }
        self.read_document(class, xml, None)
    }

    fn read_document(
        &self,
        class: &str,
        xml: &str,
        source: Option<InputSource>,
    ) -> Result<ObjectGraph, ParseError> {
        let source = source
            .filter(|_| self.schema.tracks_sources())
            .map(Arc::new);
        let tokenizer =
            Tokenizer::new(xml, self.options.add_default_entities).with_input_source(source);

        let mut deserializer = Deserializer::new(self.schema, tokenizer, self.options.strict);
        let root = deserializer.read_root(class)?;
        let (encoding, locations) = deserializer.into_parts();
        Ok(ObjectGraph {
            root,
            encoding,
            locations,
        })
    }
}
