use crate::{
    key::KeyPath,
    model::column::ColumnDef,
    schema::{IndexLayout, KeyOp},
};
use std::collections::BTreeMap;

///
/// ViewQuery
///

#[derive(Clone, Debug)]
pub struct ViewQuery {
    pub name: String,
    pub key_path: KeyPath,
    pub operator: KeyOp,
}

///
/// ViewSource
///
/// Key templates one entity type compiles into the view index attributes.
///

#[derive(Clone, Debug)]
pub struct ViewSource {
    pub type_name: String,
    pub key_path: KeyPath,
}

///
/// ViewType
///

#[derive(Debug)]
pub struct ViewType {
    pub name: String,
    pub index: IndexLayout,
    pub columns: Vec<ColumnDef>,
    pub queries: Vec<ViewQuery>,
    pub sources: BTreeMap<String, ViewSource>,
}

impl ViewType {
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&ViewQuery> {
        self.queries.iter().find(|query| query.name == name)
    }

    #[must_use]
    pub fn source(&self, type_name: &str) -> Option<&ViewSource> {
        self.sources.get(type_name)
    }
}
