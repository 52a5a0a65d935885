//! Error types for reading documents.

use thiserror::Error;

use crate::location::Location;

/// Everything that can stop a read.
///
/// The first error aborts the read; there is no partial result.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected root element '{expected}' but found '{found}' at {location}")]
    UnexpectedRootTag {
        expected: String,
        found: String,
        location: Location,
    },
    #[error("Expected root element '{expected}' but found no element at all: invalid XML document")]
    MalformedDocument { expected: String, location: Location },
    #[error("Duplicated tag: '{tag}' at {location}")]
    DuplicateElement { tag: String, location: Location },
    #[error("Unrecognised tag: '{tag}' at {location}")]
    UnknownElement { tag: String, location: Location },
    #[error("Unknown attribute '{attribute}' for tag '{tag}' at {location}")]
    UnknownAttribute {
        attribute: String,
        tag: String,
        location: Location,
    },
    #[error("Unable to parse element '{field}', must be {expected} (got '{value}') at {location}")]
    TypeCoercion {
        field: String,
        expected: &'static str,
        value: String,
        location: Location,
    },
    #[error("Missing required value for attribute '{attribute}' of tag '{tag}' at {location}")]
    MissingRequiredAttribute {
        attribute: String,
        tag: String,
        location: Location,
    },
    #[error("Expected a start or end tag but found text at {location}")]
    UnexpectedText { location: Location },
    #[error("Unexpected element '{tag}' inside text-only content at {location}")]
    UnexpectedElement { tag: String, location: Location },
    #[error("Unexpected end of XML at {location}")]
    UnexpectedEof { location: Location },

    #[error("Unknown class '{0}'")]
    UnknownClass(String),
    #[error("Class '{0}' is abstract and cannot be instantiated")]
    AbstractClass(String),
    #[error("Class '{0}' cannot be read as a document")]
    NotStandalone(String),
}

impl ParseError {
    /// Where in the input the error was detected, when known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::UnexpectedRootTag { location, .. }
            | ParseError::MalformedDocument { location, .. }
            | ParseError::DuplicateElement { location, .. }
            | ParseError::UnknownElement { location, .. }
            | ParseError::UnknownAttribute { location, .. }
            | ParseError::TypeCoercion { location, .. }
            | ParseError::MissingRequiredAttribute { location, .. }
            | ParseError::UnexpectedText { location }
            | ParseError::UnexpectedElement { location, .. }
            | ParseError::UnexpectedEof { location } => Some(location),
            ParseError::Xml(_)
            | ParseError::Attr(_)
            | ParseError::Io(_)
            | ParseError::UnknownClass(_)
            | ParseError::AbstractClass(_)
            | ParseError::NotStandalone(_) => None,
        }
    }
}
