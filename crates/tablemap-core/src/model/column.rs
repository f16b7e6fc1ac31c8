use crate::{
    convert::Converter,
    error::Error,
    path::{AccessOptions, PropertyPath, Root},
    schema::{DefaultValue, KeyRole},
    value::{Document, Item},
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

///
/// ColumnDef
///
/// One resolved column: where it lives in both dimensions, how it converts,
/// and the flags the orchestrator enforces.
///

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub path: Arc<PropertyPath>,
    pub converter: Arc<dyn Converter>,
    pub required: bool,
    pub internal: bool,
    pub exposed: bool,
    pub default: Option<DefaultValue>,
    /// Class or delegate that declared the column.
    pub owner: String,
}

impl ColumnDef {
    /// Bare top-level column, used for index attributes.
    #[must_use]
    pub fn attribute(wire: &str, converter: Arc<dyn Converter>) -> Self {
        Self {
            path: Arc::new(PropertyPath::top(wire)),
            converter,
            required: false,
            internal: false,
            exposed: false,
            default: None,
            owner: String::new(),
        }
    }

    /// Dotted property path in the object dimension.
    #[must_use]
    pub fn property(&self) -> String {
        self.path.to_string()
    }

    /// Dotted attribute path in the wire dimension.
    #[must_use]
    pub fn wire_path(&self) -> String {
        self.path.wire_path()
    }

    #[must_use]
    pub fn rebased(&self, root: Option<&Arc<PropertyPath>>) -> Self {
        Self {
            path: Arc::new(self.path.rebased(root)),
            ..self.clone()
        }
    }

    pub fn read(
        &self,
        doc: &mut Document,
        opts: AccessOptions,
    ) -> Result<Option<JsonValue>, Error> {
        self.path
            .evaluate(Root::Object(doc), self.converter.as_ref())
            .get(opts)
    }

    pub fn write(
        &self,
        doc: &mut Document,
        value: Option<JsonValue>,
        opts: AccessOptions,
    ) -> Result<(), Error> {
        self.path
            .evaluate(Root::Object(doc), self.converter.as_ref())
            .set(value, opts)
    }

    pub fn read_item(
        &self,
        item: &mut Item,
        opts: AccessOptions,
    ) -> Result<Option<JsonValue>, Error> {
        self.path
            .evaluate(Root::Attribute(item), self.converter.as_ref())
            .get(opts)
    }

    pub fn write_item(
        &self,
        item: &mut Item,
        value: Option<JsonValue>,
        opts: AccessOptions,
    ) -> Result<(), Error> {
        self.path
            .evaluate(Root::Attribute(item), self.converter.as_ref())
            .set(value, opts)
    }
}

///
/// IdentifierDef
///

#[derive(Clone, Debug)]
pub struct IdentifierDef {
    pub column: ColumnDef,
    pub role: KeyRole,
}
