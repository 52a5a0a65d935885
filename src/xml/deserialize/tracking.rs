//! Duplicate and unknown input policy.

use std::collections::HashSet;

use crate::location::Location;
use crate::xml::errors::ParseError;

/// Singular tags already consumed while parsing one entity.
#[derive(Debug, Default)]
pub(crate) struct ParsedTags {
    seen: HashSet<String>,
}

impl ParsedTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `current` tag is `tag` or `alias`.
    ///
    /// A match is recorded under `tag`, so a field read once through its
    /// alias and once through its tag is a duplicate too.
    pub fn check_field_with_duplicate(
        &mut self,
        current: &str,
        tag: &str,
        alias: Option<&str>,
        location: impl FnOnce() -> Location,
    ) -> Result<bool, ParseError> {
        if current != tag && alias != Some(current) {
            return Ok(false);
        }
        if !self.seen.insert(tag.to_string()) {
            return Err(ParseError::DuplicateElement {
                tag: current.to_string(),
                location: location(),
            });
        }
        Ok(true)
    }
}

/// Policy for an attribute no field claims.
pub(crate) fn check_unknown_attribute(
    attribute: &str,
    tag: &str,
    strict: bool,
    strict_attributes: bool,
    location: impl FnOnce() -> Location,
) -> Result<(), ParseError> {
    if strict && strict_attributes {
        return Err(ParseError::UnknownAttribute {
            attribute: attribute.to_string(),
            tag: tag.to_string(),
            location: location(),
        });
    }
    log::debug!("Ignoring unknown attribute '{}' of '{}'", attribute, tag);
    Ok(())
}
