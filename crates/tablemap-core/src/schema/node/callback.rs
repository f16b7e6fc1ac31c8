use crate::{
    context::SessionContext,
    convert::JsonConverter,
    error::Error,
    path::{AccessOptions, PropertyPath, Root},
    value::Document,
};
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};

///
/// Operation
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{label}")
    }
}

///
/// ExpectedValue
///
/// Predicate requested by a callback: the stored value at `property` (dotted
/// object path) must equal `value`, or be absent for `None`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ExpectedValue {
    pub property: String,
    pub value: Option<JsonValue>,
}

///
/// CallbackContext
///
/// What a lifecycle callback sees: the operation, the session, and the entity
/// document. Property names are relative to the callback's root, so a
/// delegate callback reads and writes inside its own sub-document.
///

pub struct CallbackContext<'a> {
    operation: Operation,
    session: &'a SessionContext,
    document: &'a mut Document,
    root: Option<Arc<PropertyPath>>,
    expected: &'a mut Vec<ExpectedValue>,
}

impl<'a> CallbackContext<'a> {
    pub(crate) const fn new(
        operation: Operation,
        session: &'a SessionContext,
        document: &'a mut Document,
        root: Option<Arc<PropertyPath>>,
        expected: &'a mut Vec<ExpectedValue>,
    ) -> Self {
        Self {
            operation,
            session,
            document,
            root,
            expected,
        }
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        self.session
    }

    /// The whole entity document, regardless of root.
    #[must_use]
    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn get(&mut self, property: &str) -> Result<Option<JsonValue>, Error> {
        let path = self.path(property);

        path.evaluate(Root::Object(&mut *self.document), &JsonConverter)
            .get(AccessOptions::read())
    }

    pub fn set(&mut self, property: &str, value: impl Into<JsonValue>) -> Result<(), Error> {
        let path = self.path(property);

        path.evaluate(Root::Object(&mut *self.document), &JsonConverter)
            .set(Some(value.into()), AccessOptions::write())
    }

    pub fn clear(&mut self, property: &str) -> Result<(), Error> {
        let path = self.path(property);

        path.evaluate(Root::Object(&mut *self.document), &JsonConverter)
            .set(None, AccessOptions::read())
    }

    /// Require the stored row to hold `value` at `property` for the write to
    /// go through.
    pub fn expect(&mut self, property: &str, value: Option<JsonValue>) {
        let property = self.path(property).to_string();

        self.expected.push(ExpectedValue { property, value });
    }

    fn path(&self, property: &str) -> PropertyPath {
        PropertyPath::new(self.root.clone(), property, property)
    }
}

impl fmt::Debug for CallbackContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackContext")
            .field("operation", &self.operation)
            .field("root", &self.root.as_ref().map(ToString::to_string))
            .finish_non_exhaustive()
    }
}

///
/// Callback
///
/// Lifecycle hook run on insert, update and delete. The only code allowed to
/// write internal columns.
///

pub trait Callback: Send + Sync {
    fn call(&self, ctx: &mut CallbackContext<'_>) -> Result<(), Error>;
}

impl<F> Callback for F
where
    F: Fn(&mut CallbackContext<'_>) -> Result<(), Error> + Send + Sync,
{
    fn call(&self, ctx: &mut CallbackContext<'_>) -> Result<(), Error> {
        self(ctx)
    }
}

///
/// CallbackDecl
///

#[derive(Clone)]
pub struct CallbackDecl {
    pub name: String,
    pub callback: Arc<dyn Callback>,
}

impl CallbackDecl {
    pub fn new(name: impl Into<String>, callback: impl Callback + 'static) -> Self {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Debug for CallbackDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDecl")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
