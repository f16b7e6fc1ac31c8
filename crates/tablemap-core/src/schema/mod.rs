//! Declarative metadata: table layout plus per-class, delegate and view
//! declarations, collected by [`CatalogBuilder`] and frozen into a [`Catalog`].
mod build;
pub mod builtin;
pub mod node;
mod table;


pub use build::{Catalog, CatalogBuilder};
pub use node::*;
pub use table::{IndexKind, IndexLayout, KeyType, LocalIndexSlot, Projection, TableLayout};
