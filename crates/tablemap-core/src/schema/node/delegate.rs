use crate::schema::node::{CallbackDecl, ColumnDecl};

///
/// Placement
///
/// Where a linked delegate's columns land on the owning row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Placement {
    /// Columns sit directly on the owner, next to its own columns.
    Flattened,
    /// Columns live inside one map-valued attribute.
    Nested { property: String, wire: String },
}

///
/// DelegateLink
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelegateLink {
    pub delegate: String,
    pub placement: Placement,
}

impl DelegateLink {
    #[must_use]
    pub fn flattened(delegate: impl Into<String>) -> Self {
        Self {
            delegate: delegate.into(),
            placement: Placement::Flattened,
        }
    }

    /// Nest under `property`, stored under an attribute of the same name.
    #[must_use]
    pub fn nested(delegate: impl Into<String>, property: impl Into<String>) -> Self {
        let property = property.into();

        Self {
            delegate: delegate.into(),
            placement: Placement::Nested {
                wire: property.clone(),
                property,
            },
        }
    }

    #[must_use]
    pub fn nested_as(
        delegate: impl Into<String>,
        property: impl Into<String>,
        wire: impl Into<String>,
    ) -> Self {
        Self {
            delegate: delegate.into(),
            placement: Placement::Nested {
                property: property.into(),
                wire: wire.into(),
            },
        }
    }
}

///
/// DelegateDecl
///
/// Reusable bundle of columns, callbacks and further delegate links.
///

#[derive(Clone, Debug)]
pub struct DelegateDecl {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
    pub callbacks: Vec<CallbackDecl>,
    pub links: Vec<DelegateLink>,
}

impl DelegateDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            callbacks: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn callback(mut self, callback: CallbackDecl) -> Self {
        self.callbacks.push(callback);
        self
    }

    #[must_use]
    pub fn link(mut self, link: DelegateLink) -> Self {
        self.links.push(link);
        self
    }
}
