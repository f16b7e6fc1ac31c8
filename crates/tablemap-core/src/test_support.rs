//! Shared fixture: a `File` entity on a single table with one numeric local
//! index and one owner view.
use crate::{
    context::SessionContext,
    convert::ConverterRegistry,
    db::{EntityManager, MemoryStore},
    resolve::TypeCatalog,
    schema::{
        Catalog, CatalogBuilder, ClassDecl, ColumnDecl, DelegateLink, FacetDecl, IdentifierDecl,
        IndexLayout, KeyOp, KeyPathDecl, KeyType, LocalIndexSlot, TableLayout, ViewDecl,
        ViewQueryDecl, ViewSourceDecl,
        builtin::{AUDIT_DELEGATE, VERSION_DELEGATE},
    },
    traits::{Entity, View},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::macros::datetime;

pub(crate) const NOW: &str = "2024-05-01T12:00:00Z";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct File {
    pub pk: Option<String>,
    pub sk: Option<String>,
    pub account: Option<String>,
    pub directory: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub owner: Option<String>,
    pub size: Option<u64>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
    pub version: Option<u64>,
}

impl File {
    pub(crate) fn new(file_name: &str) -> Self {
        Self {
            account: Some("acme".into()),
            directory: Some("root".into()),
            file_name: Some(file_name.into()),
            ..Self::default()
        }
    }

    /// Only the partition fields; queries the whole directory.
    pub(crate) fn in_root() -> Self {
        Self {
            file_name: None,
            ..Self::new("")
        }
    }

    pub(crate) fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub(crate) fn owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl Entity for File {
    const TYPE_NAME: &'static str = "File";
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnerListing {
    pub owner: Option<String>,
    pub file_name: Option<String>,
    pub size: Option<u64>,
}

impl View for OwnerListing {
    const VIEW_NAME: &'static str = "owners";
}

pub(crate) fn layout() -> TableLayout {
    TableLayout::new("files", "PK")
        .sort_key("SK")
        .local_index(LocalIndexSlot::new("bySize", "LSI1").key_type(KeyType::Number))
        .view_index(IndexLayout::global("byOwner", "GSI1PK").sort_key("GSI1SK"))
}

pub(crate) fn catalog() -> Catalog {
    let file = ClassDecl::new("File")
        .identifier(IdentifierDecl::partition("pk"))
        .identifier(IdentifierDecl::sort("sk"))
        .key_path(KeyPathDecl::new(":account/:directory").sk("file/:fileName"))
        .column(ColumnDecl::string("mimeType"))
        .column(ColumnDecl::number("size"))
        .column(ColumnDecl::string("owner"))
        .delegate(DelegateLink::flattened(AUDIT_DELEGATE))
        .delegate(DelegateLink::flattened(VERSION_DELEGATE))
        .facet(
            FacetDecl::new("bySize")
                .index("bySize")
                .template(":size")
                .operator(KeyOp::Ge),
        );

    let owners = ViewDecl::new("owners", "byOwner")
        .column(ColumnDecl::number("size"))
        .query(ViewQueryDecl::new("byOwner", "owner/:owner").sk("file/:fileName"))
        .source(ViewSourceDecl::new("File", "owner/:owner").sk("file/:fileName"));

    CatalogBuilder::new(layout())
        .class(file)
        .view(owners)
        .build()
        .expect("fixture catalog builds")
}

pub(crate) fn types() -> Arc<TypeCatalog> {
    let types = TypeCatalog::resolve(&catalog(), &ConverterRegistry::with_builtins())
        .expect("fixture catalog resolves");

    Arc::new(types)
}

pub(crate) fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(&layout()))
}

pub(crate) fn manager(store: &Arc<MemoryStore>) -> EntityManager {
    EntityManager::new(types(), Arc::clone(store) as _)
}

pub(crate) fn context() -> SessionContext {
    SessionContext::new()
        .actor("ana")
        .at(datetime!(2024-05-01 12:00:00 UTC))
}
