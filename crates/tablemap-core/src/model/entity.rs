use crate::{
    key::{KeyPath, KeyTemplate},
    model::column::{ColumnDef, IdentifierDef},
    path::PropertyPath,
    schema::{Callback, KeyOp},
};
use std::{fmt, sync::Arc};

///
/// CallbackDef
///
/// Resolved callback plus the property root it runs under.
///

#[derive(Clone)]
pub struct CallbackDef {
    pub name: String,
    pub owner: String,
    pub root: Option<Arc<PropertyPath>>,
    pub callback: Arc<dyn Callback>,
}

impl CallbackDef {
    #[must_use]
    pub fn rebased(&self, root: Option<&Arc<PropertyPath>>) -> Self {
        let root = match &self.root {
            Some(own) => Some(Arc::new(own.rebased(root))),
            None => root.cloned(),
        };

        Self {
            root,
            ..self.clone()
        }
    }
}

impl fmt::Debug for CallbackDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDef")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("root", &self.root.as_ref().map(ToString::to_string))
            .finish_non_exhaustive()
    }
}

///
/// DelegateType
///
/// Delegate with every nested link already folded in. Paths are relative to
/// the delegate; linking re-roots them.
///

#[derive(Clone, Debug)]
pub struct DelegateType {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub callbacks: Vec<CallbackDef>,
}

///
/// FacetType
///

#[derive(Clone, Debug)]
pub struct FacetType {
    pub name: String,
    /// Local index slot; `None` queries the table's own sort key.
    pub index: Option<String>,
    /// Sort attribute the facet compares against; `None` for a table
    /// without a sort key, where the facet selects the whole partition.
    pub attribute: Option<String>,
    /// Facet column for index facets.
    pub column: Option<ColumnDef>,
    pub template: Option<KeyTemplate>,
    pub operator: KeyOp,
}

///
/// EntityType
///
/// Fully resolved row layout of one mapped class.
///

#[derive(Debug)]
pub struct EntityType {
    pub name: String,
    /// Nearest parent first.
    pub ancestors: Vec<String>,
    pub partition: IdentifierDef,
    pub sort: Option<IdentifierDef>,
    /// Non-identifier columns, own declarations first.
    pub columns: Vec<ColumnDef>,
    pub facets: Vec<FacetType>,
    /// Own callbacks first, then each ancestor's.
    pub callbacks: Vec<CallbackDef>,
    pub key_path: Option<KeyPath>,
    /// Property paths serialized outward by `expose`.
    pub exposed: Vec<String>,
}

impl EntityType {
    pub fn identifiers(&self) -> impl Iterator<Item = &IdentifierDef> {
        std::iter::once(&self.partition).chain(self.sort.as_ref())
    }

    /// Identifier columns, then every other column.
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.identifiers()
            .map(|identifier| &identifier.column)
            .chain(self.columns.iter())
    }

    /// Look a column up by dotted property path.
    #[must_use]
    pub fn column(&self, property: &str) -> Option<&ColumnDef> {
        self.all_columns().find(|column| column.property() == property)
    }

    #[must_use]
    pub fn column_by_wire(&self, wire_path: &str) -> Option<&ColumnDef> {
        self.all_columns().find(|column| column.wire_path() == wire_path)
    }

    #[must_use]
    pub fn facet(&self, name: &str) -> Option<&FacetType> {
        self.facets.iter().find(|facet| facet.name == name)
    }

    pub fn callback_names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.iter().map(|callback| callback.name.as_str())
    }

    #[must_use]
    pub fn is_exposed(&self, property: &str) -> bool {
        self.exposed.iter().any(|exposed| exposed == property)
    }
}
