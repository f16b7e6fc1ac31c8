//! Type resolution.
//!
//! Turns a frozen [`Catalog`] and a [`ConverterRegistry`] into a
//! [`TypeCatalog`]: one [`EntityType`] per concrete class with inheritance and
//! delegate composition flattened into a single column list.
mod delegate;
mod entity;
mod view;


use crate::{
    convert::{Converter, ConverterRegistry},
    error::{Error, ErrorOrigin},
    model::{ColumnDef, DelegateType, EntityType, ViewType},
    path::PropertyPath,
    schema::{Catalog, ColumnDecl, ConverterRef, TableLayout},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// TypeCatalog
///
/// Immutable resolved descriptors for one table. Built once per manager and
/// shared by `Arc`.
///

#[derive(Debug)]
pub struct TypeCatalog {
    layout: TableLayout,
    entities: BTreeMap<String, Arc<EntityType>>,
    delegates: BTreeMap<String, Arc<DelegateType>>,
    views: BTreeMap<String, Arc<ViewType>>,
}

impl TypeCatalog {
    /// Resolve every concrete class, delegate and view in `catalog`.
    pub fn resolve(catalog: &Catalog, converters: &ConverterRegistry) -> Result<Self, Error> {
        let mut resolver = Resolver {
            catalog,
            converters,
            delegates: BTreeMap::new(),
        };

        for delegate in catalog.delegates() {
            resolver.delegate(&delegate.name, &mut Vec::new())?;
        }

        let mut entities = BTreeMap::new();
        for class in catalog.classes().filter(|class| !class.is_abstract) {
            let entity = resolver.entity(class)?;
            entities.insert(entity.name.clone(), Arc::new(entity));
        }

        let mut views = BTreeMap::new();
        for decl in catalog.views() {
            let view = resolver.view(decl, &entities)?;
            views.insert(view.name.clone(), Arc::new(view));
        }

        tracing::debug!(
            table = %catalog.layout().name,
            entities = entities.len(),
            delegates = resolver.delegates.len(),
            views = views.len(),
            "type catalog resolved"
        );

        Ok(Self {
            layout: catalog.layout().clone(),
            entities,
            delegates: resolver.delegates,
            views,
        })
    }

    #[must_use]
    pub const fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Resolved entity type, or a configuration error naming the type.
    pub fn entity(&self, name: &str) -> Result<&Arc<EntityType>, Error> {
        self.entities.get(name).ok_or_else(|| {
            Error::configuration(
                ErrorOrigin::Resolve,
                format!("no entity type registered as '{name}'"),
            )
        })
    }

    pub fn view(&self, name: &str) -> Result<&Arc<ViewType>, Error> {
        self.views.get(name).ok_or_else(|| {
            Error::configuration(
                ErrorOrigin::Resolve,
                format!("no view registered as '{name}'"),
            )
        })
    }

    #[must_use]
    pub fn delegate(&self, name: &str) -> Option<&Arc<DelegateType>> {
        self.delegates.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.entities.values()
    }

    pub fn views(&self) -> impl Iterator<Item = &Arc<ViewType>> {
        self.views.values()
    }

    /// Views fed by rows of `type_name`.
    pub fn views_for<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<ViewType>> {
        self.views
            .values()
            .filter(move |view| view.sources.contains_key(type_name))
    }
}

///
/// Resolver
///

struct Resolver<'a> {
    catalog: &'a Catalog,
    converters: &'a ConverterRegistry,
    delegates: BTreeMap<String, Arc<DelegateType>>,
}

impl Resolver<'_> {
    fn converter(
        &self,
        converter: &ConverterRef,
        owner: &str,
    ) -> Result<Arc<dyn Converter>, Error> {
        self.converters.get(converter.name()).ok_or_else(|| {
            Error::configuration(
                ErrorOrigin::Resolve,
                format!("'{owner}' references unknown converter '{}'", converter.name()),
            )
        })
    }

    // Top-level column with back-filled flags; linking re-roots it later.
    fn column(&self, decl: &ColumnDecl, owner: &str) -> Result<ColumnDef, Error> {
        if decl.property.is_empty() || decl.wire_name().is_empty() {
            return Err(Error::configuration(
                ErrorOrigin::Resolve,
                format!("'{owner}' declares a column with an empty name"),
            ));
        }

        Ok(ColumnDef {
            path: Arc::new(PropertyPath::new(None, &decl.property, decl.wire_name())),
            converter: self.converter(&decl.converter, owner)?,
            required: decl.required,
            internal: decl.internal.unwrap_or(false),
            exposed: decl.exposed.unwrap_or(true),
            default: decl.default.clone(),
            owner: owner.to_string(),
        })
    }
}

///
/// WireSet
///
/// Tracks claimed attribute paths within one resolved type.
///

struct WireSet<'a> {
    type_name: &'a str,
    claimed: BTreeMap<String, String>,
}

impl<'a> WireSet<'a> {
    fn new(type_name: &'a str) -> Self {
        Self {
            type_name,
            claimed: BTreeMap::new(),
        }
    }

    fn reserve(&mut self, wire: &str, owner: &str) {
        self.claimed.insert(wire.to_string(), owner.to_string());
    }

    fn claim(&mut self, column: &ColumnDef) -> Result<(), Error> {
        let wire = column.wire_path();

        match self.claimed.get(&wire) {
            Some(previous) => Err(Error::configuration(
                ErrorOrigin::Resolve,
                format!(
                    "'{}': attribute '{wire}' declared by both '{previous}' and '{}'",
                    self.type_name, column.owner
                ),
            )),
            None => {
                self.claimed.insert(wire, column.owner.clone());
                Ok(())
            }
        }
    }
}
