//! Runtime descriptors produced by the resolver.
//!
//! Nothing here is mutated after resolution; descriptors are shared by
//! `Arc` through the [`TypeCatalog`](crate::resolve::TypeCatalog).
mod column;
mod entity;
mod view;

pub use column::{ColumnDef, IdentifierDef};
pub use entity::{CallbackDef, DelegateType, EntityType, FacetType};
pub use view::{ViewQuery, ViewSource, ViewType};
