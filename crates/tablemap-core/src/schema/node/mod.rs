mod callback;
mod class;
mod column;
mod delegate;
mod facet;
mod view;

pub use callback::{Callback, CallbackContext, CallbackDecl, ExpectedValue, Operation};
pub use class::{ClassDecl, KeyPathDecl};
pub use column::{ColumnDecl, ConverterRef, DefaultValue, IdentifierDecl, KeyRole};
pub use delegate::{DelegateDecl, DelegateLink, Placement};
pub use facet::{FacetDecl, KeyOp};
pub use view::{ViewDecl, ViewQueryDecl, ViewSourceDecl};
