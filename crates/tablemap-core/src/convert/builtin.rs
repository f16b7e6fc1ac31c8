use crate::{
    convert::{ConvertError, Converter, json_label},
    value::AttributeValue,
};
use serde_json::{Number, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

fn unexpected_domain(
    converter: &'static str,
    expected: &'static str,
    value: &JsonValue,
) -> ConvertError {
    ConvertError::UnexpectedDomain {
        converter,
        expected,
        found: json_label(value).to_string(),
    }
}

const fn unexpected_wire(
    converter: &'static str,
    expected: &'static str,
    wire: &AttributeValue,
) -> ConvertError {
    ConvertError::UnexpectedWire {
        converter,
        expected,
        found: wire.type_label(),
    }
}

// Parse a wire number, preferring exact integer representations.
fn parse_number(raw: &str) -> Result<Number, ConvertError> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n.into());
    }

    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| ConvertError::InvalidNumber {
            value: raw.to_string(),
        })
}

///
/// StringConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn name(&self) -> &str {
        "string"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::String(s) => Ok(AttributeValue::S(s.clone())),
            other => Err(unexpected_domain("string", "a string", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::S(s) => Ok(JsonValue::String(s.clone())),
            other => Err(unexpected_wire("string", "S", other)),
        }
    }
}

///
/// NumberConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn name(&self) -> &str {
        "number"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::Number(n) => Ok(AttributeValue::N(n.to_string())),
            other => Err(unexpected_domain("number", "a number", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::N(raw) => parse_number(raw).map(JsonValue::Number),
            other => Err(unexpected_wire("number", "N", other)),
        }
    }
}

///
/// BooleanConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn name(&self) -> &str {
        "boolean"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::Bool(b) => Ok(AttributeValue::Bool(*b)),
            other => Err(unexpected_domain("boolean", "a boolean", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::Bool(b) => Ok(JsonValue::Bool(*b)),
            other => Err(unexpected_wire("boolean", "BOOL", other)),
        }
    }
}

///
/// DateConverter
///
/// Domain dates are RFC 3339 strings; the wire keeps the canonical RFC 3339
/// rendering so string order matches chronological order for one offset.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DateConverter;

impl DateConverter {
    fn canonical(raw: &str) -> Result<String, ConvertError> {
        let invalid = |reason: String| ConvertError::InvalidDate {
            value: raw.to_string(),
            reason,
        };

        let parsed = OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| invalid(e.to_string()))?;
        parsed.format(&Rfc3339).map_err(|e| invalid(e.to_string()))
    }
}

impl Converter for DateConverter {
    fn name(&self) -> &str {
        "date"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::String(raw) => Self::canonical(raw).map(AttributeValue::S),
            other => Err(unexpected_domain("date", "an RFC 3339 string", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::S(raw) => Self::canonical(raw).map(JsonValue::String),
            other => Err(unexpected_wire("date", "S", other)),
        }
    }
}

///
/// StringSetConverter
///
/// Domain arrays of strings map to a wire string set. Duplicates collapse and
/// the decoded array comes back in sorted order.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StringSetConverter;

impl Converter for StringSetConverter {
    fn name(&self) -> &str {
        "string_set"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        let JsonValue::Array(items) = value else {
            return Err(unexpected_domain("string_set", "an array of strings", value));
        };

        let mut set = BTreeSet::new();
        for item in items {
            match item {
                JsonValue::String(s) => {
                    set.insert(s.clone());
                }
                other => return Err(unexpected_domain("string_set", "a string element", other)),
            }
        }

        Ok(AttributeValue::Ss(set))
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::Ss(set) => Ok(JsonValue::Array(
                set.iter().cloned().map(JsonValue::String).collect(),
            )),
            other => Err(unexpected_wire("string_set", "SS", other)),
        }
    }
}

///
/// ObjectConverter
///
/// Structural converter for free-form nested values: objects become maps,
/// arrays become lists, scalars map to their natural wire variant.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectConverter;

impl ObjectConverter {
    pub(crate) fn encode(value: &JsonValue) -> AttributeValue {
        match value {
            JsonValue::Null => AttributeValue::Null,
            JsonValue::Bool(b) => AttributeValue::Bool(*b),
            JsonValue::Number(n) => AttributeValue::N(n.to_string()),
            JsonValue::String(s) => AttributeValue::S(s.clone()),
            JsonValue::Array(items) => AttributeValue::L(items.iter().map(Self::encode).collect()),
            JsonValue::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::encode(v)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    pub(crate) fn decode(wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        Ok(match wire {
            AttributeValue::Null => JsonValue::Null,
            AttributeValue::Bool(b) => JsonValue::Bool(*b),
            AttributeValue::N(raw) => JsonValue::Number(parse_number(raw)?),
            AttributeValue::S(s) => JsonValue::String(s.clone()),
            AttributeValue::Ss(set) => {
                JsonValue::Array(set.iter().cloned().map(JsonValue::String).collect())
            }
            AttributeValue::L(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Self::decode)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            AttributeValue::M(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), Self::decode(v)?);
                }
                JsonValue::Object(out)
            }
        })
    }
}

impl Converter for ObjectConverter {
    fn name(&self) -> &str {
        "object"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::Object(_) => Ok(Self::encode(value)),
            other => Err(unexpected_domain("object", "an object", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::M(_) => Self::decode(wire),
            other => Err(unexpected_wire("object", "M", other)),
        }
    }
}

///
/// ListConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ListConverter;

impl Converter for ListConverter {
    fn name(&self) -> &str {
        "list"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        match value {
            JsonValue::Array(_) => Ok(ObjectConverter::encode(value)),
            other => Err(unexpected_domain("list", "an array", other)),
        }
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        match wire {
            AttributeValue::L(_) => ObjectConverter::decode(wire),
            other => Err(unexpected_wire("list", "L", other)),
        }
    }
}

///
/// JsonConverter
///
/// Pass-through for any JSON value, stored structurally.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonConverter;

impl Converter for JsonConverter {
    fn name(&self) -> &str {
        "json"
    }

    fn to_wire(&self, value: &JsonValue) -> Result<AttributeValue, ConvertError> {
        Ok(ObjectConverter::encode(value))
    }

    fn from_wire(&self, wire: &AttributeValue) -> Result<JsonValue, ConvertError> {
        ObjectConverter::decode(wire)
    }
}
