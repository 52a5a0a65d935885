//! Quick-xml adapter for schema-driven reading.
//!
//! This module wraps quick-xml's low-level event API in a pull tokenizer
//! so the deserializer only deals with tags, attributes and text.

pub mod de;

pub use de::{Token, Tokenizer, skip_element};
