//! Pull tokenizer over quick-xml.
//!
//! Provides:
//! - `Tokenizer`: a cursor yielding start tags, end tags and text, with the
//!   name, attributes and position of the current event
//! - `skip_element`: subtree skipping for unknown elements

use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::location::{InputSource, Location};
use crate::xml::entities;
use crate::xml::errors::ParseError;

/// Kind of the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    StartTag,
    EndTag,
    Text,
    EndDocument,
}

/// A pull cursor over an in-memory document.
///
/// Empty elements are reported as a start tag followed by an end tag.
/// CDATA sections are reported as text. Comments, processing instructions,
/// the doctype and the XML declaration are consumed silently.
pub struct Tokenizer<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    default_entities: bool,
    input_source: Option<Arc<InputSource>>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    /// Byte offset where the current event starts.
    offset: usize,
    /// Zero-based line and character column of `offset`.
    line: usize,
    column: usize,
    encoding: Option<String>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer. With `default_entities` the XHTML named
    /// references resolve; otherwise only the predefined five do.
    pub fn new(source: &'a str, default_entities: bool) -> Self {
        let mut reader = Reader::from_str(source);
        reader.trim_text(false);
        reader.expand_empty_elements(true);

        Self {
            source,
            reader,
            default_entities,
            input_source: None,
            name: String::new(),
            attributes: Vec::new(),
            text: String::new(),
            offset: 0,
            line: 0,
            column: 0,
            encoding: None,
        }
    }

    /// Attach caller-supplied provenance to every reported location.
    pub fn with_input_source(mut self, source: Option<Arc<InputSource>>) -> Self {
        self.input_source = source;
        self
    }

    /// Advance to the next start tag, end tag, text run or end of document.
    pub fn next(&mut self) -> Result<Token, ParseError> {
        let defaults = self.default_entities;
        loop {
            self.seek(self.reader.buffer_position());
            match self.reader.read_event()? {
                Event::Start(e) => {
                    self.name = element_name(&e);
                    self.attributes = read_attributes(&e, &self.reader, defaults)?;
                    self.text.clear();
                    return Ok(Token::StartTag);
                }
                Event::End(e) => {
                    self.name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.attributes.clear();
                    self.text.clear();
                    return Ok(Token::EndTag);
                }
                Event::Text(e) => {
                    self.text = e
                        .unescape_with(|entity| entities::resolve(entity, defaults))?
                        .into_owned();
                    return Ok(Token::Text);
                }
                Event::CData(e) => {
                    self.text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    return Ok(Token::Text);
                }
                Event::Decl(decl) => {
                    if let Some(Ok(encoding)) = decl.encoding() {
                        self.encoding = Some(String::from_utf8_lossy(&encoding).into_owned());
                    }
                }
                Event::Eof => {
                    self.name.clear();
                    self.attributes.clear();
                    self.text.clear();
                    return Ok(Token::EndDocument);
                }
                Event::Empty(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Advance to the next start or end tag, skipping whitespace.
    ///
    /// Other text is an error in strict mode and dropped otherwise.
    pub fn next_tag(&mut self, strict: bool) -> Result<Token, ParseError> {
        loop {
            match self.next()? {
                Token::Text if self.text.trim().is_empty() => {}
                Token::Text if strict => {
                    return Err(ParseError::UnexpectedText {
                        location: self.location(),
                    });
                }
                Token::Text => {
                    log::warn!("Ignoring text '{}' at {}", self.text.trim(), self.location());
                }
                Token::EndDocument => {
                    return Err(ParseError::UnexpectedEof {
                        location: self.location(),
                    });
                }
                token => return Ok(token),
            }
        }
    }

    /// Read the text of the current element up to its end tag.
    ///
    /// Must be called on a start tag; leaves the cursor on the end tag.
    pub fn next_text(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Token::Text => text.push_str(&self.text),
                Token::EndTag => return Ok(text),
                Token::StartTag => {
                    return Err(ParseError::UnexpectedElement {
                        tag: self.name.clone(),
                        location: self.location(),
                    });
                }
                Token::EndDocument => {
                    return Err(ParseError::UnexpectedEof {
                        location: self.location(),
                    });
                }
            }
        }
    }

    /// Skip the subtree of the current start tag, leaving the cursor on its
    /// end tag.
    pub fn skip_element(&mut self) -> Result<(), ParseError> {
        skip_element(self)
    }

    /// Name of the current start or end tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes of the current start tag, in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text of the current text event.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position of the first character of the current event.
    pub fn location(&self) -> Location {
        Location::new(self.line + 1, self.column + 1).with_source(self.input_source.clone())
    }

    /// Move the line/column cursor forward to `offset`.
    ///
    /// Event offsets never decrease, so each byte is scanned once.
    fn seek(&mut self, offset: usize) {
        let offset = offset.min(self.source.len());
        if offset <= self.offset {
            return;
        }
        for &byte in &self.source.as_bytes()[self.offset..offset] {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.column = 0;
                }
                // UTF-8 continuation bytes belong to the previous character.
                b if b & 0xC0 == 0x80 => {}
                _ => self.column += 1,
            }
        }
        self.offset = offset;
    }

    /// Encoding named by the XML declaration, `UTF-8` when there is none.
    pub fn encoding(&self) -> &str {
        self.encoding.as_deref().unwrap_or("UTF-8")
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn read_attributes(
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    default_entities: bool,
) -> Result<Vec<(String, String)>, ParseError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value_with(reader, |entity| {
                entities::resolve(entity, default_entities)
            })?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

/// Skip an entire element subtree, consuming all nested content until the
/// matching end tag.
///
/// Call this right after a `StartTag`; the cursor ends on the matching
/// `EndTag`.
pub fn skip_element(tokenizer: &mut Tokenizer<'_>) -> Result<(), ParseError> {
    let mut depth = 1u32;
    while depth > 0 {
        match tokenizer.next()? {
            Token::StartTag => depth += 1,
            Token::EndTag => depth -= 1,
            Token::Text => {}
            Token::EndDocument => {
                return Err(ParseError::UnexpectedEof {
                    location: tokenizer.location(),
                });
            }
        }
    }
    Ok(())
}
