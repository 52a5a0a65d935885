//! Schema model: classes, fields, associations and their XML mapping.
//!
//! A [`Schema`] is assembled with [`SchemaBuilder`] and validated once on
//! [`SchemaBuilder::build`]. After that it is immutable and can be shared by
//! any number of concurrent reads. Tag names are resolved at build time into
//! one [`ClassLayout`] per class, which is what the reader dispatches on.

pub mod naming;
pub mod validation;

use std::collections::HashMap;

use indexmap::IndexMap;

pub use naming::{NamingConvention, singular};
pub use validation::SchemaError;

/// Semantic type of a scalar field or of an externally-typed collection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Char,
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Float,
    Double,
    String,
    /// Date-time, parsed with the field's format.
    Date,
    /// Free-form element tree, kept as an [`XmlNode`](crate::model::XmlNode).
    Dom,
}

impl ScalarType {
    /// What a value of this type must look like, for error messages.
    pub fn description(self) -> &'static str {
        match self {
            ScalarType::Boolean => "a boolean",
            ScalarType::Char => "a character",
            ScalarType::Byte => "a byte",
            ScalarType::Short => "a short integer",
            ScalarType::Int => "an integer",
            ScalarType::Long => "a long integer",
            ScalarType::Float | ScalarType::Double => "a floating point number",
            ScalarType::String => "a string",
            ScalarType::Date => "a date",
            ScalarType::Dom => "an element tree",
        }
    }

    /// Whether a value of this type can be read from attribute text.
    pub fn is_textual(self) -> bool {
        !matches!(self, ScalarType::Dom)
    }
}

/// Element type of a list or set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    /// A class of the schema; items are parsed as nested entities.
    Class(String),
    /// A type outside the schema's class set; items are coerced from text.
    Scalar(ScalarType),
}

impl ItemType {
    pub fn class(name: impl Into<String>) -> Self {
        ItemType::Class(name.into())
    }
}

/// How the entries of a map field are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapEncoding {
    /// `<properties><key1>value1</key1></properties>`
    #[default]
    Inline,
    /// `<properties><property><key>key1</key><value>value1</value></property></properties>`
    Explode,
}

/// What a field holds, and therefore how the reader materializes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// A single nested entity of class `target`.
    One { target: String },
    /// Ordered items. `wrapped` items sit inside one extra element named
    /// after the field.
    List { item: ItemType, wrapped: bool },
    /// Like `List`, but equal items are kept once.
    Set { item: ItemType, wrapped: bool },
    /// String keys to string values.
    Map { encoding: MapEncoding },
}

/// One field or association of a class, with its XML metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Textual default, coerced through the field's type.
    pub default: Option<String>,
    /// Second accepted tag name.
    pub alias: Option<String>,
    /// Explicit tag name, bypassing the naming convention.
    pub tag_name: Option<String>,
    /// Explicit tag name of collection items or map entries.
    pub item_tag: Option<String>,
    /// Read from an attribute of the owning element.
    pub attribute: bool,
    /// Read from the owning element's own text.
    pub content: bool,
    pub trim: bool,
    /// Date format (`chrono` strftime syntax, or `long` for epoch millis).
    pub format: Option<String>,
    pub required: bool,
}

impl FieldDescriptor {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            alias: None,
            tag_name: None,
            item_tag: None,
            attribute: false,
            content: false,
            trim: true,
            format: None,
            required: false,
        }
    }

    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::with_kind(name, FieldKind::Scalar(ty))
    }

    pub fn one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::One {
                target: target.into(),
            },
        )
    }

    /// A wrapped list; see [`FieldDescriptor::unwrapped`].
    pub fn list(name: impl Into<String>, item: ItemType) -> Self {
        Self::with_kind(
            name,
            FieldKind::List {
                item,
                wrapped: true,
            },
        )
    }

    /// A wrapped set; see [`FieldDescriptor::unwrapped`].
    pub fn set(name: impl Into<String>, item: ItemType) -> Self {
        Self::with_kind(
            name,
            FieldKind::Set {
                item,
                wrapped: true,
            },
        )
    }

    pub fn map(name: impl Into<String>, encoding: MapEncoding) -> Self {
        Self::with_kind(name, FieldKind::Map { encoding })
    }

    pub fn attribute(mut self) -> Self {
        self.attribute = true;
        self
    }

    pub fn content(mut self) -> Self {
        self.content = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    pub fn item_tag(mut self, tag: impl Into<String>) -> Self {
        self.item_tag = Some(tag.into());
        self
    }

    /// Items repeat directly inside the owning element. No effect on
    /// non-collection fields.
    pub fn unwrapped(mut self) -> Self {
        if let FieldKind::List { wrapped, .. } | FieldKind::Set { wrapped, .. } = &mut self.kind {
            *wrapped = false;
        }
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The scalar type, for scalar fields.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(ty) => Some(ty),
            _ => None,
        }
    }
}

/// One class of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub is_abstract: bool,
    /// Fields of the superclass are inherited and precede this class's own.
    pub superclass: Option<String>,
    pub tag_name: Option<String>,
    /// May be read as the document element by [`SchemaReader::read_class`](crate::xml::SchemaReader::read_class).
    pub standalone_read: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            superclass: None,
            tag_name: None,
            standalone_read: false,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    pub fn standalone(mut self) -> Self {
        self.standalone_read = true;
        self
    }
}

/// A field together with its resolved tag names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlField {
    pub descriptor: FieldDescriptor,
    /// Element or attribute name of the field.
    pub tag: String,
    /// Element name of collection items or map entries.
    pub item_tag: String,
}

impl XmlField {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.descriptor.alias.as_deref()
    }
}

/// Resolved XML view of a class: its tag and all fields, inherited first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub tag: String,
    pub fields: Vec<XmlField>,
    content: Option<usize>,
}

impl ClassLayout {
    /// The field absorbing the element's own text, if any.
    pub fn content_field(&self) -> Option<&XmlField> {
        self.content.map(|idx| &self.fields[idx])
    }

    /// The attribute field whose tag is `name`.
    pub fn attribute_field(&self, name: &str) -> Option<&XmlField> {
        self.fields
            .iter()
            .find(|f| f.descriptor.attribute && f.tag == name)
    }

    pub fn attribute_fields(&self) -> impl Iterator<Item = &XmlField> {
        self.fields.iter().filter(|f| f.descriptor.attribute)
    }

    /// Fields read from child elements, in dispatch order.
    pub fn element_fields(&self) -> impl Iterator<Item = &XmlField> {
        self.fields
            .iter()
            .filter(|f| !f.descriptor.attribute && !f.descriptor.content)
    }
}

/// An immutable, validated schema.
#[derive(Debug, Clone)]
pub struct Schema {
    classes: IndexMap<String, ClassDescriptor>,
    layouts: HashMap<String, ClassLayout>,
    root: String,
    naming: NamingConvention,
    strict_attributes: bool,
    location_tracker: Option<String>,
    source_tracker: Option<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// The document root class.
    pub fn root(&self) -> &ClassDescriptor {
        &self.classes[self.root.as_str()]
    }

    pub fn layout(&self, class: &str) -> Option<&ClassLayout> {
        self.layouts.get(class)
    }

    pub fn naming(&self) -> NamingConvention {
        self.naming
    }

    /// Whether unknown attributes are errors in strict mode.
    pub fn strict_attributes(&self) -> bool {
        self.strict_attributes
    }

    pub fn location_tracker(&self) -> Option<&str> {
        self.location_tracker.as_deref()
    }

    pub fn source_tracker(&self) -> Option<&str> {
        self.source_tracker.as_deref()
    }

    pub fn tracks_locations(&self) -> bool {
        self.location_tracker.is_some()
    }

    pub fn tracks_sources(&self) -> bool {
        self.location_tracker.is_some() && self.source_tracker.is_some()
    }

    /// Tracker classes describe locations; they are never parse targets.
    pub fn is_tracking_support(&self, class: &str) -> bool {
        self.location_tracker.as_deref() == Some(class)
            || self.source_tracker.as_deref() == Some(class)
    }
}

/// Collects classes and schema-wide settings; [`build`](Self::build)
/// validates them.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    classes: Vec<ClassDescriptor>,
    roots: Vec<String>,
    naming: NamingConvention,
    strict_attributes: bool,
    location_tracker: Option<String>,
    source_tracker: Option<String>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            roots: Vec::new(),
            naming: NamingConvention::default(),
            strict_attributes: true,
            location_tracker: None,
            source_tracker: None,
        }
    }
}

impl SchemaBuilder {
    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    /// Mark `class` as the document root.
    pub fn root(mut self, class: impl Into<String>) -> Self {
        self.roots.push(class.into());
        self
    }

    pub fn naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn strict_attributes(mut self, strict: bool) -> Self {
        self.strict_attributes = strict;
        self
    }

    /// Enable location tracking; `class` names the location class.
    pub fn location_tracker(mut self, class: impl Into<String>) -> Self {
        self.location_tracker = Some(class.into());
        self
    }

    /// Thread caller-supplied source data into every location.
    pub fn source_tracker(mut self, class: impl Into<String>) -> Self {
        self.source_tracker = Some(class.into());
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut classes = IndexMap::with_capacity(self.classes.len());
        for class in self.classes {
            if classes.contains_key(&class.name) {
                return Err(SchemaError::DuplicateClass(class.name));
            }
            classes.insert(class.name.clone(), class);
        }

        let root = validation::validate_root(&classes, self.roots)?;
        for tracker in [&self.location_tracker, &self.source_tracker]
            .into_iter()
            .flatten()
        {
            if !classes.contains_key(tracker) {
                return Err(SchemaError::UnknownTracker(tracker.clone()));
            }
        }

        let mut layouts = HashMap::with_capacity(classes.len());
        for class in classes.values() {
            let chain = validation::inheritance_chain(&classes, class)?;
            let layout = resolve_layout(self.naming, class, &chain);
            validation::validate_layout(&classes, class, &layout)?;
            layouts.insert(class.name.clone(), layout);
        }

        Ok(Schema {
            classes,
            layouts,
            root,
            naming: self.naming,
            strict_attributes: self.strict_attributes,
            location_tracker: self.location_tracker,
            source_tracker: self.source_tracker,
        })
    }
}

/// Resolve tags for `class`, whose ancestors (root-most first) are `chain`.
fn resolve_layout(
    naming: NamingConvention,
    class: &ClassDescriptor,
    chain: &[&ClassDescriptor],
) -> ClassLayout {
    let tag = class
        .tag_name
        .clone()
        .unwrap_or_else(|| naming.apply(&class.name));

    let mut fields = Vec::new();
    let mut content = None;
    for descriptor in chain.iter().flat_map(|c| c.fields.iter()) {
        let field_tag = descriptor
            .tag_name
            .clone()
            .unwrap_or_else(|| naming.apply(&descriptor.name));
        let item_tag = descriptor
            .item_tag
            .clone()
            .unwrap_or_else(|| singular(&field_tag));
        if descriptor.content && content.is_none() {
            content = Some(fields.len());
        }
        fields.push(XmlField {
            descriptor: descriptor.clone(),
            tag: field_tag,
            item_tag,
        });
    }

    ClassLayout {
        tag,
        fields,
        content,
    }
}
