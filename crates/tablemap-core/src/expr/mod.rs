//! Condition expressions.
//!
//! Filter, key-condition and conditional-write expressions share one
//! [`AliasCore`]: attribute names and values are replaced by stable
//! placeholders, and every clause is kept in structured form next to its
//! rendered text so a store client can evaluate it without parsing.
mod alias;
mod builders;

#[cfg(test)]
mod tests;

pub use alias::AliasCore;
pub use builders::{ConditionBuilder, ExpectedBuilder, KeyConditionBuilder};

use crate::{
    convert::ConvertError,
    error::{Error, ErrorOrigin},
    model::ColumnDef,
    value::AttributeValue,
};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};

///
/// ConditionKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConditionKind {
    BeginsWith,
    Between,
    Contains,
    Eq,
    Ge,
    Gt,
    In,
    Le,
    Lt,
    Ne,
    NotContains,
    NotNull,
    Null,
}

impl ConditionKind {
    /// Whether `count` wire values is a valid operand for this kind.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::NotNull | Self::Null => count == 0,
            Self::In => count > 0,
            Self::Between => count == 2,
            _ => count == 1,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BeginsWith => "BEGINS_WITH",
            Self::Between => "BETWEEN",
            Self::Contains => "CONTAINS",
            Self::Eq => "EQ",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::In => "IN",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Ne => "NE",
            Self::NotContains => "NOT_CONTAINS",
            Self::NotNull => "NOT_NULL",
            Self::Null => "NULL",
        };

        write!(f, "{label}")
    }
}

///
/// Operand
///
/// Domain-side right-hand side of a condition, before conversion.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Operand {
    #[default]
    None,
    One(JsonValue),
    Many(Vec<JsonValue>),
    Range(JsonValue, JsonValue),
}

impl From<JsonValue> for Operand {
    fn from(value: JsonValue) -> Self {
        if value.is_null() {
            Self::None
        } else {
            Self::One(value)
        }
    }
}

impl From<Option<JsonValue>> for Operand {
    fn from(value: Option<JsonValue>) -> Self {
        value.map_or(Self::None, Self::from)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::One(JsonValue::from(value))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::One(JsonValue::from(value))
    }
}

///
/// Clause
///
/// One pushed condition: the wire attribute segments it tests, the converted
/// operand values, and its rendered text.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub kind: ConditionKind,
    pub attribute: Vec<String>,
    pub values: Vec<AttributeValue>,
    pub text: String,
}

impl Clause {
    /// Dotted wire path of the tested attribute.
    #[must_use]
    pub fn path(&self) -> String {
        self.attribute.join(".")
    }
}

///
/// Expression
///
/// Finished expression. `names` maps name placeholders to attribute names,
/// `values` maps value placeholders to wire values.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    pub text: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, AttributeValue>,
    pub clauses: Vec<Clause>,
}

impl Expression {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `None` for an empty expression, which the store treats as no condition.
    #[must_use]
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

///
/// ExpressionBuilder
///
/// Shared surface of the three builders. Every method pushes one clause; the
/// final expression is the conjunction of clauses in push order.
///

pub trait ExpressionBuilder: Sized {
    fn core(&self) -> &AliasCore;

    fn core_mut(&mut self) -> &mut AliasCore;

    /// Builder-specific structural check run before a clause is pushed.
    fn admit(&self, _kind: ConditionKind, _attribute: &[&str]) -> Result<(), Error> {
        Ok(())
    }

    /// Push a clause with a domain operand converted through the column.
    fn apply(
        &mut self,
        kind: ConditionKind,
        column: &ColumnDef,
        operand: impl Into<Operand>,
    ) -> Result<&mut Self, Error> {
        let (kind, values) = convert_operand(kind, column, operand.into())?;

        self.apply_wire(kind, column, values)
    }

    /// Push a clause whose operand is already in wire form.
    fn apply_wire(
        &mut self,
        kind: ConditionKind,
        column: &ColumnDef,
        values: Vec<AttributeValue>,
    ) -> Result<&mut Self, Error> {
        if !kind.accepts(values.len()) {
            return Err(Error::validation(
                ErrorOrigin::Expression,
                format!(
                    "{kind} on '{}' cannot take {} value(s)",
                    column.wire_path(),
                    values.len()
                ),
            ));
        }

        let attribute = column.path.wire_chain();
        self.admit(kind, &attribute)?;
        self.core_mut().push(kind, &attribute, values);

        Ok(self)
    }

    fn eq(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Eq, column, value)
    }

    fn ne(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Ne, column, value)
    }

    fn le(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Le, column, value)
    }

    fn lt(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Lt, column, value)
    }

    fn ge(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Ge, column, value)
    }

    fn gt(&mut self, column: &ColumnDef, value: impl Into<Operand>) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Gt, column, value)
    }

    fn not_null(&mut self, column: &ColumnDef) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::NotNull, column, Operand::None)
    }

    fn null(&mut self, column: &ColumnDef) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Null, column, Operand::None)
    }

    fn contains(
        &mut self,
        column: &ColumnDef,
        value: impl Into<Operand>,
    ) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Contains, column, value)
    }

    fn not_contains(
        &mut self,
        column: &ColumnDef,
        value: impl Into<Operand>,
    ) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::NotContains, column, value)
    }

    fn begins_with(
        &mut self,
        column: &ColumnDef,
        value: impl Into<Operand>,
    ) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::BeginsWith, column, value)
    }

    fn in_list<I>(&mut self, column: &ColumnDef, values: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = JsonValue>,
    {
        let values = values.into_iter().collect();
        self.apply(ConditionKind::In, column, Operand::Many(values))
    }

    fn between(
        &mut self,
        column: &ColumnDef,
        low: JsonValue,
        high: JsonValue,
    ) -> Result<&mut Self, Error> {
        self.apply(ConditionKind::Between, column, Operand::Range(low, high))
    }

    fn is_empty(&self) -> bool {
        self.core().is_empty()
    }

    fn build(&self) -> Expression {
        self.core().build()
    }
}

// Normalise the operand against its kind, then convert each value through the
// column converter.
fn convert_operand(
    kind: ConditionKind,
    column: &ColumnDef,
    operand: Operand,
) -> Result<(ConditionKind, Vec<AttributeValue>), Error> {
    let mismatch = |kind: ConditionKind| {
        Error::validation(
            ErrorOrigin::Expression,
            format!("{kind} on '{}' has a mismatched operand", column.wire_path()),
        )
    };
    let convert = |value: &JsonValue| {
        column
            .converter
            .to_wire(value)
            .map_err(|err| operand_error(column, &err))
    };

    let values = match (kind, operand) {
        (ConditionKind::Eq, Operand::None) => return Ok((ConditionKind::Null, Vec::new())),
        (ConditionKind::Ne, Operand::None) => return Ok((ConditionKind::NotNull, Vec::new())),
        (ConditionKind::Null | ConditionKind::NotNull, Operand::None) => Vec::new(),
        (ConditionKind::Contains | ConditionKind::NotContains, Operand::One(value)) => {
            // set columns test membership of a scalar element
            vec![convert(&value).or_else(|err| scalar_wire(&value).ok_or(err))?]
        }
        (ConditionKind::In, Operand::One(value)) => vec![convert(&value)?],
        (ConditionKind::In, Operand::Many(values)) => {
            values.iter().map(convert).collect::<Result<Vec<_>, _>>()?
        }
        (ConditionKind::Between, Operand::Range(low, high)) => {
            vec![convert(&low)?, convert(&high)?]
        }
        (
            ConditionKind::Null
            | ConditionKind::NotNull
            | ConditionKind::In
            | ConditionKind::Between,
            _,
        )
        | (_, Operand::None | Operand::Many(_) | Operand::Range(..)) => {
            return Err(mismatch(kind));
        }
        (_, Operand::One(value)) => vec![convert(&value)?],
    };

    Ok((kind, values))
}

fn operand_error(column: &ColumnDef, err: &ConvertError) -> Error {
    Error::validation(
        ErrorOrigin::Expression,
        format!("operand for '{}': {err}", column.wire_path()),
    )
}

fn scalar_wire(value: &JsonValue) -> Option<AttributeValue> {
    match value {
        JsonValue::String(s) => Some(AttributeValue::S(s.clone())),
        JsonValue::Number(n) => Some(AttributeValue::N(n.to_string())),
        JsonValue::Bool(b) => Some(AttributeValue::Bool(*b)),
        _ => None,
    }
}
