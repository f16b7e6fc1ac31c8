//! Column converters.
//!
//! A converter maps one domain value (object dimension) to one wire attribute
//! (attribute dimension) and back. Converters are collaborators: the engine
//! only depends on the [`Converter`] trait, and columns reference converters
//! by name through the [`ConverterRegistry`].
mod builtin;
mod registry;

#[cfg(test)]
mod tests;

pub use builtin::{
    BooleanConverter, DateConverter, JsonConverter, ListConverter, NumberConverter,
    ObjectConverter, StringConverter, StringSetConverter,
};
pub use registry::ConverterRegistry;

use crate::value::AttributeValue;
use serde_json::Value as JsonValue;
use std::fmt::Debug;
use thiserror::Error as ThisError;

///
/// Converter
///

pub trait Converter: Debug + Send + Sync {
    /// Registry name of this converter.
    fn name(&self) -> &str;

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError>;

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError>;
}

///
/// ConvertError
///

#[derive(Debug, ThisError)]
pub enum ConvertError {
    #[error("{converter} converter expects {expected}, found {found}")]
    UnexpectedDomain {
        converter: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("{converter} converter expects wire {expected}, found {found}")]
    UnexpectedWire {
        converter: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid number '{value}'")]
    InvalidNumber { value: String },

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
}

/// Short JSON type label for diagnostics.
pub(crate) const fn json_label(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
