//! Logical search predicates over stored attributes.
//!
//! A [`Filter`] is backend-neutral: the in-memory store evaluates it with
//! [`Filter::matches`], the SQLite store translates it to SQL. The
//! `Display` form is LDAP-style and used only for logs and error messages.

use std::fmt;

use crate::attrs::{AttrValue, Attributes};

/// A predicate over an entry's attributes.
///
/// Multi-valued attributes match when any one of their values matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `attr` has a value equal to `value` (compared by rendered form).
    Equals { attr: String, value: AttrValue },
    /// `attr` has an integer value `>= value`. Text values never match.
    GreaterOrEqual { attr: String, value: i64 },
    /// `attr` is present with at least one value.
    Present { attr: String },
    /// Every sub-filter matches. An empty conjunction matches everything.
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(attr: &str, value: impl Into<AttrValue>) -> Self {
        Filter::Equals {
            attr: attr.to_string(),
            value: value.into(),
        }
    }

    pub fn greater_or_equal(attr: &str, value: i64) -> Self {
        Filter::GreaterOrEqual {
            attr: attr.to_string(),
            value,
        }
    }

    pub fn present(attr: &str) -> Self {
        Filter::Present {
            attr: attr.to_string(),
        }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    /// Evaluates the predicate against an attribute bag.
    pub fn matches(&self, attrs: &Attributes) -> bool {
        match self {
            Filter::Equals { attr, value } => attrs
                .get(attr)
                .is_some_and(|values| values.iter().any(|v| v.loosely_equals(value))),
            Filter::GreaterOrEqual { attr, value } => attrs.get(attr).is_some_and(|values| {
                values
                    .iter()
                    .filter_map(AttrValue::as_int)
                    .any(|v| v >= *value)
            }),
            Filter::Present { attr } => attrs.contains(attr),
            Filter::And(filters) => filters.iter().all(|f| f.matches(attrs)),
        }
    }
}

/// Escapes the characters LDAP filter syntax reserves.
fn escape_value(raw: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in raw.chars() {
        match c {
            '*' => f.write_str("\\2a")?,
            '(' => f.write_str("\\28")?,
            ')' => f.write_str("\\29")?,
            '\\' => f.write_str("\\5c")?,
            '\0' => f.write_str("\\00")?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Equals { attr, value } => {
                write!(f, "({}=", attr)?;
                escape_value(&value.to_string(), f)?;
                f.write_str(")")
            }
            Filter::GreaterOrEqual { attr, value } => write!(f, "({}>={})", attr, value),
            Filter::Present { attr } => write!(f, "({}=*)", attr),
            Filter::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
        }
    }
}
