//! Core runtime for tablemap: schema declarations, the type resolver,
//! property and key paths, expression builders, and the CRUD orchestrator
//! that maps typed entities onto rows of one key-value table.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod context;
pub mod convert;
pub mod db;
pub mod error;
pub mod expr;
pub mod key;
pub mod model;
pub mod obs;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of local secondary index slots a table layout may declare.
///
/// Matches the per-table limit of the backing store.
pub const MAX_LOCAL_INDEXES: usize = 5;

/// Attribute holding the registered type name when a layout does not name one.
pub const DEFAULT_TYPE_COLUMN: &str = "__type";

/// Facet name used when a facet query does not name one.
pub const DEFAULT_FACET: &str = "default";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, builders, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        context::SessionContext,
        schema::{ClassDecl, ColumnDecl, DelegateLink, IdentifierDecl, KeyOp, Operation},
        traits::{Entity, View},
        value::{AttributeValue, Document, Item},
    };
}
