#![allow(dead_code)]

use std::sync::Arc;
use tablemap::{EntityManager, MemoryStore, StoreClient, prelude::*};

pub const TABLE: &str = "files";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub pk: Option<String>,
    pub sk: Option<String>,
    pub account: Option<String>,
    pub directory: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
    pub version: Option<u64>,
}

impl File {
    pub fn named(account: &str, directory: &str, file_name: &str) -> Self {
        Self {
            account: Some(account.into()),
            directory: Some(directory.into()),
            file_name: Some(file_name.into()),
            ..Self::default()
        }
    }

    pub fn directory(account: &str, directory: &str) -> Self {
        Self {
            account: Some(account.into()),
            directory: Some(directory.into()),
            ..Self::default()
        }
    }
}

impl Entity for File {
    const TYPE_NAME: &'static str = "File";
}

pub fn layout() -> TableLayout {
    TableLayout::new(TABLE, "PK").sort_key("SK")
}

pub fn catalog() -> CatalogBuilder {
    CatalogBuilder::new(layout()).class(
        ClassDecl::new("File")
            .identifier(IdentifierDecl::partition("pk"))
            .identifier(IdentifierDecl::sort("sk"))
            .key_path(KeyPathDecl::new(":account/:directory").sk("file/:fileName"))
            .column(ColumnDecl::string("mimeType"))
            .column(ColumnDecl::number("size"))
            .delegate(DelegateLink::flattened(AUDIT_DELEGATE))
            .delegate(DelegateLink::flattened(VERSION_DELEGATE)),
    )
}

pub fn open(store: Arc<dyn StoreClient>) -> EntityManager {
    tablemap::open(catalog(), store).expect("catalog opens")
}

pub fn memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(&layout()))
}

pub fn session() -> SessionContext {
    SessionContext::new().actor("ana")
}
