use crate::traits::Entity;
use serde_json::Value as JsonValue;

///
/// Expected
///
/// Caller-supplied previous values for a conditional update or delete. Each
/// field becomes an equality predicate (or an absence check for `None`).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expected {
    /// Entity type the expectations were written for; checked against the
    /// written entity when present.
    pub type_name: Option<String>,
    pub fields: Vec<(String, Option<JsonValue>)>,
}

impl Expected {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_entity<E: Entity>() -> Self {
        Self {
            type_name: Some(E::TYPE_NAME.to_string()),
            fields: Vec::new(),
        }
    }

    /// Expect `property` (dotted path) to currently hold `value`.
    #[must_use]
    pub fn field(
        mut self,
        property: impl Into<String>,
        value: impl Into<Option<JsonValue>>,
    ) -> Self {
        self.fields.push((property.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
