use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// SessionContext
///
/// Caller identity and clock for one unit of work.
/// Handed to default suppliers, callbacks and write middleware.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    pub actor: Option<String>,
    pub now: OffsetDateTime,
    pub attributes: BTreeMap<String, JsonValue>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actor: None,
            now: OffsetDateTime::now_utc(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Pin the session clock.
    #[must_use]
    pub const fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Session clock rendered as RFC 3339.
    #[must_use]
    pub fn now_rfc3339(&self) -> String {
        // RFC 3339 only rejects years outside 0..=9999
        self.now
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.now.unix_timestamp().to_string())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
