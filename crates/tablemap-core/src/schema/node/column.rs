use crate::context::SessionContext;
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};

///
/// ConverterRef
///
/// Converter reference, resolved against the converter registry when the
/// catalog is resolved.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConverterRef {
    Boolean,
    Custom(String),
    Date,
    Json,
    List,
    Number,
    Object,
    String,
    StringSet,
}

impl ConverterRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Custom(name) => name,
            Self::Date => "date",
            Self::Json => "json",
            Self::List => "list",
            Self::Number => "number",
            Self::Object => "object",
            Self::String => "string",
            Self::StringSet => "string_set",
        }
    }
}

///
/// DefaultValue
///
/// Supplier for a column left unset on create or update.
///

#[derive(Clone)]
pub enum DefaultValue {
    Static(JsonValue),
    /// Fresh ULID string.
    Ulid,
    /// Session clock as RFC 3339.
    Now,
    With(Arc<dyn Fn(&SessionContext) -> JsonValue + Send + Sync>),
}

impl DefaultValue {
    pub fn with(f: impl Fn(&SessionContext) -> JsonValue + Send + Sync + 'static) -> Self {
        Self::With(Arc::new(f))
    }

    #[must_use]
    pub fn supply(&self, ctx: &SessionContext) -> JsonValue {
        match self {
            Self::Static(value) => value.clone(),
            Self::Ulid => JsonValue::String(ulid::Ulid::new().to_string()),
            Self::Now => JsonValue::String(ctx.now_rfc3339()),
            Self::With(f) => f(ctx),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Ulid => f.write_str("Ulid"),
            Self::Now => f.write_str("Now"),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}

///
/// ColumnDecl
///

#[derive(Clone, Debug)]
pub struct ColumnDecl {
    pub property: String,
    /// Attribute name; the property name when unset.
    pub wire: Option<String>,
    pub converter: ConverterRef,
    pub required: bool,
    /// `None` until back-filled by the resolver.
    pub internal: Option<bool>,
    pub exposed: Option<bool>,
    pub default: Option<DefaultValue>,
}

impl ColumnDecl {
    #[must_use]
    pub fn new(property: impl Into<String>, converter: ConverterRef) -> Self {
        Self {
            property: property.into(),
            wire: None,
            converter,
            required: false,
            internal: None,
            exposed: None,
            default: None,
        }
    }

    #[must_use]
    pub fn string(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::String)
    }

    #[must_use]
    pub fn number(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::Number)
    }

    #[must_use]
    pub fn boolean(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::Boolean)
    }

    #[must_use]
    pub fn date(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::Date)
    }

    #[must_use]
    pub fn string_set(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::StringSet)
    }

    #[must_use]
    pub fn object(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::Object)
    }

    #[must_use]
    pub fn list(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::List)
    }

    #[must_use]
    pub fn json(property: impl Into<String>) -> Self {
        Self::new(property, ConverterRef::Json)
    }

    #[must_use]
    pub fn wire(mut self, name: impl Into<String>) -> Self {
        self.wire = Some(name.into());
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn internal(mut self) -> Self {
        self.internal = Some(true);
        self
    }

    #[must_use]
    pub const fn exposed(mut self, exposed: bool) -> Self {
        self.exposed = Some(exposed);
        self
    }

    #[must_use]
    pub fn default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.wire.as_deref().unwrap_or(&self.property)
    }
}

///
/// KeyRole
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyRole {
    Partition,
    Sort,
}

///
/// IdentifierDecl
///
/// Primary-key column. Its attribute name comes from the table layout and it
/// is always required.
///

#[derive(Clone, Debug)]
pub struct IdentifierDecl {
    pub property: String,
    pub role: KeyRole,
    pub converter: ConverterRef,
}

impl IdentifierDecl {
    #[must_use]
    pub fn partition(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            role: KeyRole::Partition,
            converter: ConverterRef::String,
        }
    }

    #[must_use]
    pub fn sort(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            role: KeyRole::Sort,
            converter: ConverterRef::String,
        }
    }

    #[must_use]
    pub fn converter(mut self, converter: ConverterRef) -> Self {
        self.converter = converter;
        self
    }
}
