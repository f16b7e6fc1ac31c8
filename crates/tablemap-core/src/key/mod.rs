//! Structured key paths.
//!
//! Several domain fields compile into one key string (`":account/:directory"`
//! → `"acme/root"`) and parse back out of it when a row is rehydrated.
mod template;

#[cfg(test)]
mod tests;

pub use template::{DEFAULT_SEPARATOR, KeyTemplate, Segment};

use crate::value::Document;
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt::Debug, sync::Arc};
use thiserror::Error as ThisError;

///
/// KeyPathError
///

#[derive(Debug, ThisError)]
pub enum KeyPathError {
    #[error("invalid key template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("key template '{template}' has no value for ':{field}'")]
    MissingValue { template: String, field: String },

    #[error("field '{field}' cannot be used in a key: {reason}")]
    UnsupportedValue { field: String, reason: String },

    #[error("key '{value}' does not match template '{template}': {reason}")]
    Mismatch {
        template: String,
        value: String,
        reason: String,
    },
}

///
/// KeySource
///
/// Anything that can supply placeholder values by field name.
/// `Ok(None)` means the field is unset.
///

pub trait KeySource {
    fn key_value(&self, field: &str) -> Result<Option<String>, KeyPathError>;
}

impl KeySource for Document {
    fn key_value(&self, field: &str) -> Result<Option<String>, KeyPathError> {
        match self.get(field) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.clone())),
            Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
            Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(KeyPathError::UnsupportedValue {
                field: field.to_string(),
                reason: "only scalar values can be compiled into keys".to_string(),
            }),
        }
    }
}

impl KeySource for BTreeMap<String, String> {
    fn key_value(&self, field: &str) -> Result<Option<String>, KeyPathError> {
        Ok(self.get(field).cloned())
    }
}

///
/// PathEngine
///
/// Compiles and parses one key template. The default [`TemplateEngine`]
/// implements the literal/placeholder grammar; a KeyPath may carry a custom
/// engine for keys that need a different encoding.
///

pub trait PathEngine: Debug + Send + Sync {
    fn compile(&self, template: &KeyTemplate, source: &dyn KeySource)
    -> Result<String, KeyPathError>;

    fn compile_prefix(
        &self,
        template: &KeyTemplate,
        source: &dyn KeySource,
    ) -> Result<String, KeyPathError> {
        template.compile_prefix(source)
    }

    fn parse(
        &self,
        template: &KeyTemplate,
        compiled: &str,
    ) -> Result<BTreeMap<String, String>, KeyPathError>;
}

///
/// TemplateEngine
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateEngine;

impl PathEngine for TemplateEngine {
    fn compile(
        &self,
        template: &KeyTemplate,
        source: &dyn KeySource,
    ) -> Result<String, KeyPathError> {
        template.compile(source)
    }

    fn parse(
        &self,
        template: &KeyTemplate,
        compiled: &str,
    ) -> Result<BTreeMap<String, String>, KeyPathError> {
        template.parse(compiled)
    }
}

///
/// KeyPath
///
/// PK template, optional SK template and the engine that drives both.
/// Fixed at type resolution and shared by every instance of the type.
///

#[derive(Clone, Debug)]
pub struct KeyPath {
    pub pk: KeyTemplate,
    pub sk: Option<KeyTemplate>,
    engine: Arc<dyn PathEngine>,
}

impl KeyPath {
    #[must_use]
    pub fn new(pk: KeyTemplate, sk: Option<KeyTemplate>) -> Self {
        Self {
            pk,
            sk,
            engine: Arc::new(TemplateEngine),
        }
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn PathEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn compile_pk(&self, source: &dyn KeySource) -> Result<String, KeyPathError> {
        self.engine.compile(&self.pk, source)
    }

    /// Compile the SK, or `None` when this path has no SK template.
    pub fn compile_sk(&self, source: &dyn KeySource) -> Result<Option<String>, KeyPathError> {
        self.sk
            .as_ref()
            .map(|sk| self.engine.compile(sk, source))
            .transpose()
    }

    pub fn compile_sk_prefix(
        &self,
        source: &dyn KeySource,
    ) -> Result<Option<String>, KeyPathError> {
        self.sk
            .as_ref()
            .map(|sk| self.engine.compile_prefix(sk, source))
            .transpose()
    }

    /// Parse compiled PK/SK strings back into field values.
    pub fn parse(
        &self,
        pk: &str,
        sk: Option<&str>,
    ) -> Result<BTreeMap<String, String>, KeyPathError> {
        let mut fields = self.engine.parse(&self.pk, pk)?;

        if let (Some(template), Some(sk)) = (&self.sk, sk) {
            fields.extend(self.engine.parse(template, sk)?);
        }

        Ok(fields)
    }

    /// Every field name referenced by either template.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.pk
            .placeholders()
            .chain(self.sk.iter().flat_map(KeyTemplate::placeholders))
    }
}
