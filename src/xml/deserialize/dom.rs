//! Free-form element trees.

use crate::model::XmlNode;
use crate::xml::errors::ParseError;
use crate::xml::quick::{Token, Tokenizer};

/// Build a node from the current start tag through its end tag.
///
/// Every attribute is kept, prefixed ones included. Text of the element is
/// concatenated and trimmed; whitespace-only text leaves `value` unset.
pub(crate) fn build_node(tokenizer: &mut Tokenizer<'_>) -> Result<XmlNode, ParseError> {
    let mut node = XmlNode::new(tokenizer.name());
    for (name, value) in tokenizer.attributes() {
        node.attributes.insert(name.clone(), value.clone());
    }

    let mut text = String::new();
    loop {
        match tokenizer.next()? {
            Token::StartTag => node.children.push(build_node(tokenizer)?),
            Token::Text => text.push_str(tokenizer.text()),
            Token::EndTag => break,
            Token::EndDocument => {
                return Err(ParseError::UnexpectedEof {
                    location: tokenizer.location(),
                });
            }
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        node.value = Some(text.to_string());
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nested_tree() {
        let xml = r#"<configuration xmlns:x="urn:x" x:mode="fast">
            <source>1.8</source>
            <flags><flag>-g</flag><flag>-O2</flag></flags>
            <empty/>
        </configuration>"#;
        let mut tok = Tokenizer::new(xml, true);
        tok.next().unwrap();
        let node = build_node(&mut tok).unwrap();

        let expected = XmlNode::new("configuration")
            .with_attribute("xmlns:x", "urn:x")
            .with_attribute("x:mode", "fast")
            .with_child(XmlNode::new("source").with_value("1.8"))
            .with_child(
                XmlNode::new("flags")
                    .with_child(XmlNode::new("flag").with_value("-g"))
                    .with_child(XmlNode::new("flag").with_value("-O2")),
            )
            .with_child(XmlNode::new("empty"));
        assert_eq!(node, expected);
        assert_eq!(tok.name(), "configuration");
    }

    #[test]
    fn test_truncated_tree() {
        let mut tok = Tokenizer::new("<a><b>", true);
        tok.next().unwrap();
        assert!(build_node(&mut tok).is_err());
    }
}
