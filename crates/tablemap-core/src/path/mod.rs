//! Property paths and accessors.
//!
//! A [`PropertyPath`] names one leaf property reached through zero or more
//! nested containers. The same path is evaluated in two dimensions:
//!
//! - [`Dimension::Object`] walks the domain document by property name;
//! - [`Dimension::Attribute`] walks the wire item by attribute name and runs
//!   the leaf converter.
//!
//! A path's parent is itself a path, so a property three delegates deep
//! resolves by evaluating its parent in the same dimension, three hops down.
#[cfg(test)]
mod tests;

use crate::{
    convert::Converter,
    error::{Error, ErrorOrigin},
    value::{AttributeValue, Document, Item, is_set},
};
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};

///
/// Dimension
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dimension {
    Object,
    Attribute,
}

///
/// Root
///
/// The container a path is evaluated against. The variant is the dimension.
///

#[derive(Debug)]
pub enum Root<'a> {
    Object(&'a mut Document),
    Attribute(&'a mut Item),
}

impl Root<'_> {
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        match self {
            Self::Object(_) => Dimension::Object,
            Self::Attribute(_) => Dimension::Attribute,
        }
    }
}

///
/// AccessOptions
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccessOptions {
    /// Create missing intermediate containers on write.
    pub generate: bool,
    /// Raise instead of returning `None` when the value is missing.
    pub throw_if_not_found: bool,
}

impl AccessOptions {
    #[must_use]
    pub const fn read() -> Self {
        Self {
            generate: false,
            throw_if_not_found: false,
        }
    }

    #[must_use]
    pub const fn write() -> Self {
        Self {
            generate: true,
            throw_if_not_found: false,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.throw_if_not_found = true;
        self
    }
}

///
/// PropertyPath
///
/// One hop: the property name in the object dimension and the attribute name
/// in the wire dimension, plus the parent hop (if any).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyPath {
    parent: Option<Arc<Self>>,
    property: String,
    wire: String,
}

impl PropertyPath {
    #[must_use]
    pub fn new(
        parent: Option<Arc<Self>>,
        property: impl Into<String>,
        wire: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            property: property.into(),
            wire: wire.into(),
        }
    }

    /// Top-level path where property and wire names coincide.
    #[must_use]
    pub fn top(name: &str) -> Self {
        Self::new(None, name, name)
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn wire(&self) -> &str {
        &self.wire
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    /// Property names from the document root down to this leaf.
    #[must_use]
    pub fn object_chain(&self) -> Vec<&str> {
        let mut chain = self.parent.as_ref().map_or_else(Vec::new, |p| p.object_chain());
        chain.push(&self.property);
        chain
    }

    /// Attribute names from the item root down to this leaf.
    #[must_use]
    pub fn wire_chain(&self) -> Vec<&str> {
        let mut chain = self.parent.as_ref().map_or_else(Vec::new, |p| p.wire_chain());
        chain.push(&self.wire);
        chain
    }

    /// Dotted wire path, unique per column within a resolved type.
    #[must_use]
    pub fn wire_path(&self) -> String {
        self.wire_chain().join(".")
    }

    /// The same hops re-rooted under `root`.
    #[must_use]
    pub fn rebased(&self, root: Option<&Arc<Self>>) -> Self {
        let parent = match &self.parent {
            Some(parent) => Some(Arc::new(parent.rebased(root))),
            None => root.cloned(),
        };

        Self {
            parent,
            property: self.property.clone(),
            wire: self.wire.clone(),
        }
    }

    /// Bind this path to a root container.
    #[must_use]
    pub fn evaluate<'a>(&'a self, root: Root<'a>, converter: &'a dyn Converter) -> Accessor<'a> {
        Accessor {
            path: self,
            root,
            converter,
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.object_chain().join("."))
    }
}

///
/// Accessor
///
/// Ephemeral pairing of a path and a root container.
///

#[derive(Debug)]
pub struct Accessor<'a> {
    path: &'a PropertyPath,
    root: Root<'a>,
    converter: &'a dyn Converter,
}

impl Accessor<'_> {
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.root.dimension()
    }

    /// Read the domain value at this path.
    ///
    /// In the attribute dimension the wire value is decoded through the leaf
    /// converter first.
    pub fn get(&self, opts: AccessOptions) -> Result<Option<JsonValue>, Error> {
        let value = match &self.root {
            Root::Object(doc) => object_container(self.path.parent(), doc)?
                .and_then(|container| container.get(self.path.property()))
                .filter(|v| !v.is_null())
                .cloned(),
            Root::Attribute(item) => match attribute_container(self.path.parent(), item)?
                .and_then(|container| container.get(self.path.wire()))
            {
                None | Some(AttributeValue::Null) => None,
                Some(wire) => Some(self.converter.from_wire(wire).map_err(|err| {
                    Error::corruption(
                        ErrorOrigin::Convert,
                        format!("attribute '{}': {err}", self.path.wire_path()),
                    )
                })?),
            },
        };

        if value.is_none() && opts.throw_if_not_found {
            return Err(not_found(self.path, self.dimension()));
        }

        Ok(value)
    }

    /// Write (or clear, with `None`) the domain value at this path.
    ///
    /// In the attribute dimension the value is encoded through the leaf
    /// converter. Missing containers are created only with `generate`.
    pub fn set(&mut self, value: Option<JsonValue>, opts: AccessOptions) -> Result<(), Error> {
        let path = self.path;
        let value = value.filter(|v| !v.is_null());

        match &mut self.root {
            Root::Object(doc) => {
                let Some(container) = object_container_mut(path.parent(), doc, opts.generate)?
                else {
                    return missing_container(path, Dimension::Object, opts);
                };
                match value {
                    Some(value) => {
                        container.insert(path.property().to_string(), value);
                    }
                    None => {
                        container.remove(path.property());
                    }
                }
            }
            Root::Attribute(item) => {
                let wire = value
                    .as_ref()
                    .map(|v| self.converter.to_wire(v))
                    .transpose()
                    .map_err(|err| {
                        Error::validation(ErrorOrigin::Convert, format!("property '{path}': {err}"))
                    })?;
                let Some(container) = attribute_container_mut(path.parent(), item, opts.generate)?
                else {
                    return missing_container(path, Dimension::Attribute, opts);
                };
                match wire {
                    Some(wire) => {
                        container.insert(path.wire().to_string(), wire);
                    }
                    None => {
                        container.remove(path.wire());
                    }
                }
            }
        }

        Ok(())
    }
}

fn missing_container(
    path: &PropertyPath,
    dimension: Dimension,
    opts: AccessOptions,
) -> Result<(), Error> {
    if opts.throw_if_not_found {
        Err(not_found(path, dimension))
    } else {
        Ok(())
    }
}

fn not_found(path: &PropertyPath, dimension: Dimension) -> Error {
    match dimension {
        Dimension::Object => {
            Error::validation(ErrorOrigin::Path, format!("property '{path}' not found"))
        }
        Dimension::Attribute => Error::validation(
            ErrorOrigin::Path,
            format!("attribute '{}' not found", path.wire_path()),
        ),
    }
}

fn not_a_container(path: &PropertyPath, dimension: Dimension) -> Error {
    match dimension {
        Dimension::Object => Error::validation(
            ErrorOrigin::Path,
            format!("property '{path}' is not an object"),
        ),
        Dimension::Attribute => Error::corruption(
            ErrorOrigin::Path,
            format!("attribute '{}' is not a map", path.wire_path()),
        ),
    }
}

fn object_container<'c>(
    path: Option<&PropertyPath>,
    root: &'c Document,
) -> Result<Option<&'c Document>, Error> {
    let Some(path) = path else {
        return Ok(Some(root));
    };
    let Some(parent) = object_container(path.parent(), root)? else {
        return Ok(None);
    };

    match parent.get(path.property()) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Object(map)) => Ok(Some(map)),
        Some(_) => Err(not_a_container(path, Dimension::Object)),
    }
}

fn object_container_mut<'c>(
    path: Option<&PropertyPath>,
    root: &'c mut Document,
    generate: bool,
) -> Result<Option<&'c mut Document>, Error> {
    let Some(path) = path else {
        return Ok(Some(root));
    };
    let Some(parent) = object_container_mut(path.parent(), root, generate)? else {
        return Ok(None);
    };

    if !is_set(parent.get(path.property())) {
        if !generate {
            return Ok(None);
        }
        parent.insert(
            path.property().to_string(),
            JsonValue::Object(Document::new()),
        );
    }

    match parent.get_mut(path.property()) {
        Some(JsonValue::Object(map)) => Ok(Some(map)),
        _ => Err(not_a_container(path, Dimension::Object)),
    }
}

fn attribute_container<'c>(
    path: Option<&PropertyPath>,
    root: &'c Item,
) -> Result<Option<&'c Item>, Error> {
    let Some(path) = path else {
        return Ok(Some(root));
    };
    let Some(parent) = attribute_container(path.parent(), root)? else {
        return Ok(None);
    };

    match parent.get(path.wire()) {
        None | Some(AttributeValue::Null) => Ok(None),
        Some(AttributeValue::M(map)) => Ok(Some(map)),
        Some(_) => Err(not_a_container(path, Dimension::Attribute)),
    }
}

fn attribute_container_mut<'c>(
    path: Option<&PropertyPath>,
    root: &'c mut Item,
    generate: bool,
) -> Result<Option<&'c mut Item>, Error> {
    let Some(path) = path else {
        return Ok(Some(root));
    };
    let Some(parent) = attribute_container_mut(path.parent(), root, generate)? else {
        return Ok(None);
    };

    if matches!(parent.get(path.wire()), None | Some(AttributeValue::Null)) {
        if !generate {
            return Ok(None);
        }
        parent.insert(path.wire().to_string(), AttributeValue::M(Item::new()));
    }

    match parent.get_mut(path.wire()) {
        Some(AttributeValue::M(map)) => Ok(Some(map)),
        _ => Err(not_a_container(path, Dimension::Attribute)),
    }
}
