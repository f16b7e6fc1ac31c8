//! ## Crate layout
//! - `core`: schema declarations, type resolution, property and key paths,
//!   expression builders, the CRUD orchestrator, and observability.
//!
//! The `prelude` module carries what application code needs to declare a
//! table, register entity classes, and run sessions against a store.

pub use tablemap_core as core;

/// re-exports
///
/// entity types derive serde traits; this saves callers a direct dependency
pub mod __reexports {
    pub use serde;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{
    DEFAULT_FACET, DEFAULT_TYPE_COLUMN, MAX_LOCAL_INDEXES,
    db::{self, EntityManager, ManagerConfig, MemoryStore, Session, StoreClient},
    error::Error,
};

use core::{
    convert::ConverterRegistry,
    schema::{Catalog, CatalogBuilder},
};
use std::sync::Arc;

/// Freeze `builder`, resolve it against the built-in converters, and open a
/// manager over `store`.
pub fn open(
    builder: CatalogBuilder,
    store: Arc<dyn StoreClient>,
) -> Result<EntityManager, Error> {
    let catalog = builder.build()?;

    open_with(&catalog, &ConverterRegistry::with_builtins(), store)
}

/// Like [`open`], with an explicit converter registry.
pub fn open_with(
    catalog: &Catalog,
    converters: &ConverterRegistry,
    store: Arc<dyn StoreClient>,
) -> Result<EntityManager, Error> {
    EntityManager::from_catalog(catalog, converters, store)
}

///
/// Prelude
///
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        context::SessionContext,
        db::{EntityManager, Expected, ManagerConfig, Order, Session, StoreClient as _},
        expr::ExpressionBuilder as _,
        schema::{
            CallbackContext, CallbackDecl, CatalogBuilder, ClassDecl, ColumnDecl, DefaultValue,
            DelegateLink, FacetDecl, IdentifierDecl, IndexLayout, KeyOp, KeyPathDecl, KeyType,
            LocalIndexSlot, Operation, TableLayout, ViewDecl, ViewQueryDecl, ViewSourceDecl,
            builtin::{AUDIT_DELEGATE, VERSION_DELEGATE},
        },
        traits::{Entity, View},
        value::{AttributeValue, Document, Item},
    };
    pub use serde::{Deserialize, Serialize};
}
