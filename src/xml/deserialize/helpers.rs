//! Text to scalar coercion.
//!
//! This module provides helper functions for:
//! - Coercing element and attribute text into typed [`Value`]s
//! - Parsing dates with a per-field format
//! - The strict/lenient fallback for malformed numbers

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_traits::Zero;

use crate::location::Location;
use crate::model::Value;
use crate::schema::{FieldDescriptor, ScalarType};
use crate::xml::errors::ParseError;

/// Format used for dates when the field names none.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Date format meaning "milliseconds since the Unix epoch".
pub const EPOCH_MILLIS_FORMAT: &str = "long";

/// The field-level settings coercion depends on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'f> {
    pub field: &'f str,
    pub trim: bool,
    pub format: Option<&'f str>,
    pub default: Option<&'f str>,
}

impl<'f> Target<'f> {
    pub fn of(descriptor: &'f FieldDescriptor) -> Self {
        Self {
            field: &descriptor.name,
            trim: descriptor.trim,
            format: descriptor.format.as_deref(),
            default: descriptor.default.as_deref(),
        }
    }
}

/// Coerce `raw` into a value of type `ty`.
///
/// Booleans never fail. Numbers and characters fail only in strict mode and
/// fall back to zero otherwise. Dates always fail on bad input.
pub(crate) fn coerce(
    ty: ScalarType,
    raw: &str,
    target: &Target<'_>,
    strict: bool,
    location: &Location,
) -> Result<Value, ParseError> {
    let text = if target.trim { raw.trim() } else { raw };
    let mismatch = || ParseError::TypeCoercion {
        field: target.field.to_string(),
        expected: ty.description(),
        value: text.to_string(),
        location: location.clone(),
    };

    let value = match ty {
        ScalarType::Boolean => Value::Bool(parse_bool(text, target.default)),
        ScalarType::Char => match text.chars().next() {
            Some(c) => Value::Char(c),
            None if strict => return Err(mismatch()),
            None => Value::Char('\0'),
        },
        ScalarType::Byte => Value::Byte(parse_number(text, target, ty, strict, location)?),
        ScalarType::Short => Value::Short(parse_number(text, target, ty, strict, location)?),
        ScalarType::Int => Value::Int(parse_number(text, target, ty, strict, location)?),
        ScalarType::Long => Value::Long(parse_number(text, target, ty, strict, location)?),
        ScalarType::Float => Value::Float(parse_number(text, target, ty, strict, location)?),
        ScalarType::Double => Value::Double(parse_number(text, target, ty, strict, location)?),
        ScalarType::String => Value::String(text.to_string()),
        ScalarType::Date => {
            let format = target.format.unwrap_or(DEFAULT_DATE_FORMAT);
            Value::Date(parse_date(text, format).ok_or_else(mismatch)?)
        }
        ScalarType::Dom => return Err(mismatch()),
    };
    Ok(value)
}

/// `true` iff the text is `true` in any case. Empty text takes the default.
fn parse_bool(text: &str, default: Option<&str>) -> bool {
    let text = if text.is_empty() {
        default.unwrap_or_default().trim()
    } else {
        text
    };
    text.eq_ignore_ascii_case("true")
}

fn parse_number<T>(
    text: &str,
    target: &Target<'_>,
    ty: ScalarType,
    strict: bool,
    location: &Location,
) -> Result<T, ParseError>
where
    T: FromStr + Zero,
{
    match text.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) if strict => Err(ParseError::TypeCoercion {
            field: target.field.to_string(),
            expected: ty.description(),
            value: text.to_string(),
            location: location.clone(),
        }),
        Err(_) => {
            log::warn!(
                "Unable to parse element '{}', must be {} (got '{}') at {}; using 0",
                target.field,
                ty.description(),
                text,
                location
            );
            Ok(T::zero())
        }
    }
}

/// Parse a date-time. A format without time fields yields midnight.
pub fn parse_date(text: &str, format: &str) -> Option<NaiveDateTime> {
    if format == EPOCH_MILLIS_FORMAT {
        let millis = text.parse::<i64>().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|d| d.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(field: &str) -> Target<'_> {
        Target {
            field,
            trim: true,
            format: None,
            default: None,
        }
    }

    fn loc() -> Location {
        Location::new(1, 1)
    }

    #[test]
    fn test_bool_never_fails() {
        let t = target("flag");
        for (text, expected) in [("true", true), ("TRUE", true), ("yes", false), ("1", false)] {
            assert_eq!(
                coerce(ScalarType::Boolean, text, &t, true, &loc()).unwrap(),
                Value::Bool(expected)
            );
        }
    }

    #[test]
    fn test_bool_empty_uses_default() {
        let mut t = target("flag");
        assert_eq!(
            coerce(ScalarType::Boolean, "  ", &t, true, &loc()).unwrap(),
            Value::Bool(false)
        );
        t.default = Some("true");
        assert_eq!(
            coerce(ScalarType::Boolean, "", &t, true, &loc()).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_number_strict_and_lenient() {
        let t = target("port");
        let err = coerce(ScalarType::Int, "eighty", &t, true, &loc()).unwrap_err();
        match err {
            ParseError::TypeCoercion {
                field,
                expected,
                value,
                ..
            } => {
                assert_eq!(field, "port");
                assert_eq!(expected, "an integer");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            coerce(ScalarType::Int, "eighty", &t, false, &loc()).unwrap(),
            Value::Int(0)
        );
        assert_eq!(
            coerce(ScalarType::Double, " 2.5 ", &t, true, &loc()).unwrap(),
            Value::Double(2.5)
        );
    }

    #[test]
    fn test_byte_range() {
        let t = target("b");
        assert_eq!(
            coerce(ScalarType::Byte, "-128", &t, true, &loc()).unwrap(),
            Value::Byte(-128)
        );
        assert!(coerce(ScalarType::Byte, "128", &t, true, &loc()).is_err());
    }

    #[test]
    fn test_untrimmed_number_fails() {
        let mut t = target("n");
        t.trim = false;
        assert!(coerce(ScalarType::Long, " 7", &t, true, &loc()).is_err());
    }

    #[test]
    fn test_char() {
        let t = target("c");
        assert_eq!(
            coerce(ScalarType::Char, "xyz", &t, true, &loc()).unwrap(),
            Value::Char('x')
        );
        assert!(coerce(ScalarType::Char, "", &t, true, &loc()).is_err());
        assert_eq!(
            coerce(ScalarType::Char, "", &t, false, &loc()).unwrap(),
            Value::Char('\0')
        );
    }

    #[test]
    fn test_string_trim_flag() {
        let mut t = target("s");
        assert_eq!(
            coerce(ScalarType::String, "  a b ", &t, true, &loc()).unwrap(),
            Value::String("a b".into())
        );
        t.trim = false;
        assert_eq!(
            coerce(ScalarType::String, "  a b ", &t, true, &loc()).unwrap(),
            Value::String("  a b ".into())
        );
    }

    #[test]
    fn test_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_milli_opt(12, 30, 5, 250))
            .unwrap();
        assert_eq!(
            parse_date("2024-03-01T12:30:05.250", DEFAULT_DATE_FORMAT),
            Some(expected)
        );
        assert_eq!(
            parse_date("1709296205250", EPOCH_MILLIS_FORMAT),
            Some(expected)
        );
        assert_eq!(
            parse_date("2024-03-01", "%Y-%m-%d"),
            NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_date("yesterday", DEFAULT_DATE_FORMAT), None);
    }

    #[test]
    fn test_bad_date_fails_even_when_lenient() {
        let t = target("released");
        assert!(coerce(ScalarType::Date, "soon", &t, false, &loc()).is_err());
    }
}
