#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

///
/// Document
///
/// Object-dimension shape of one entity or view instance.
/// A `null` or missing property is treated as unset.
///

pub type Document = serde_json::Map<String, serde_json::Value>;

///
/// Item
///
/// Wire-dimension shape of one stored row, keyed by attribute name.
///

pub type Item = BTreeMap<String, AttributeValue>;

///
/// AttributeValue
///
/// Wire attribute value exchanged with the backing store.
///
/// Numbers travel as their decimal string encoding so no precision is lost
/// between the domain value and the store.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    Bool(bool),
    Ss(BTreeSet<String>),
    M(BTreeMap<String, Self>),
    L(Vec<Self>),
    Null,
}

impl AttributeValue {
    /// Build a number attribute from anything with a decimal rendering.
    #[must_use]
    pub fn number(value: impl fmt::Display) -> Self {
        Self::N(value.to_string())
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::S(value.into())
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::M(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Ss(_) => "SS",
            Self::M(_) => "M",
            Self::L(_) => "L",
            Self::Null => "NULL",
        }
    }

    /// Order two attributes the way the store orders sort keys.
    ///
    /// Strings compare bytewise, numbers numerically; mixed or
    /// non-scalar variants are incomparable.
    #[must_use]
    pub fn key_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::S(a), Self::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Self::N(a), Self::N(b)) => number_cmp(a, b),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

// Integral strings compare exactly; only fractional or exponent forms go
// through f64.
fn number_cmp(a: &str, b: &str) -> Option<Ordering> {
    if let (Ok(a), Ok(b)) = (a.parse::<i128>(), b.parse::<i128>()) {
        return Some(a.cmp(&b));
    }
    if let (Ok(a), Ok(b)) = (a.parse::<u128>(), b.parse::<u128>()) {
        return Some(a.cmp(&b));
    }

    let a = a.parse::<f64>().ok()?;
    let b = b.parse::<f64>().ok()?;
    a.partial_cmp(&b)
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(value) | Self::N(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Ss(values) => {
                let joined = values.iter().cloned().collect::<Vec<_>>().join(",");
                write!(f, "[{joined}]")
            }
            Self::M(map) => write!(f, "{{{} attrs}}", map.len()),
            Self::L(list) => write!(f, "[{} items]", list.len()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Render an item key (identifier attributes only) for diagnostics.
#[must_use]
pub fn render_key(key: &Item) -> String {
    key.iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a document property is present and not null.
#[must_use]
pub fn is_set(value: Option<&serde_json::Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}
