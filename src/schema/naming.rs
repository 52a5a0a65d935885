//! Tag-name derivation for classes and fields.
//!
//! A field without an explicit tag name maps to the field name passed through
//! the schema's [`NamingConvention`]. The item tag of a multi-valued
//! association defaults to the singular of the field's tag:
//! - `dependencies` → `<dependency>`
//! - `mailingLists` → `<mailingList>`
//! - `properties` → `<property>`

use heck::{AsKebabCase, AsLowerCamelCase, AsPascalCase, AsSnakeCase};

/// Case convention applied to class and field names that have no explicit
/// tag name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingConvention {
    /// Use the declared name verbatim.
    AsIs,
    /// `groupId`, `Model` → `model`
    #[default]
    LowerCamelCase,
    /// `group-id`
    KebabCase,
    /// `group_id`
    SnakeCase,
    /// `GroupId`
    PascalCase,
}

impl NamingConvention {
    /// Apply the convention to a declared name.
    pub fn apply(self, name: &str) -> String {
        match self {
            NamingConvention::AsIs => name.to_string(),
            NamingConvention::LowerCamelCase => format!("{}", AsLowerCamelCase(name)),
            NamingConvention::KebabCase => format!("{}", AsKebabCase(name)),
            NamingConvention::SnakeCase => format!("{}", AsSnakeCase(name)),
            NamingConvention::PascalCase => format!("{}", AsPascalCase(name)),
        }
    }
}

/// Irregular plural → singular mappings, matched against the end of a name.
static IRREGULARS: &[(&str, &str)] = &[
    ("aliases", "alias"),
    ("analyses", "analysis"),
    ("children", "child"),
    ("criteria", "criterion"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("people", "person"),
    ("statuses", "status"),
    ("vertices", "vertex"),
];

/// Singular form of a tag name, keeping the case of the untouched prefix.
///
/// Only the trailing word is inspected, so `mailingLists` becomes
/// `mailingList` and `developerRoles` becomes `developerRole`.
pub fn singular(name: &str) -> String {
    let lower = name.to_ascii_lowercase();

    if let Some((plural, single)) = IRREGULARS
        .iter()
        .find(|(plural, _)| lower.ends_with(plural))
    {
        let prefix = &name[..name.len() - plural.len()];
        return restore_case(prefix, &name[prefix.len()..], single);
    }

    if lower.ends_with("ies") && name.len() > 3 {
        return format!("{}y", &name[..name.len() - 3]);
    }

    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if lower.ends_with(suffix) {
            return name[..name.len() - 2].to_string();
        }
    }

    if lower.ends_with("ss") || lower.ends_with("us") {
        return name.to_string();
    }

    if lower.ends_with('s') && name.len() > 1 {
        return name[..name.len() - 1].to_string();
    }

    name.to_string()
}

/// Re-attach `prefix` to `single`, upper-casing the first letter of `single`
/// when the replaced word started with an upper-case letter.
fn restore_case(prefix: &str, replaced: &str, single: &str) -> String {
    let capitalised = replaced.chars().next().is_some_and(|c| c.is_uppercase());
    let mut out = String::with_capacity(prefix.len() + single.len());
    out.push_str(prefix);
    if capitalised {
        let mut chars = single.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(single);
    }
    out
}
