use crate::{
    error::{Error, ErrorOrigin},
    schema::{
        builtin,
        node::{ClassDecl, DelegateDecl, ViewDecl},
        table::TableLayout,
    },
};
use std::collections::BTreeMap;

///
/// CatalogBuilder
///
/// Collects declarations in any order. Nothing is checked until
/// [`build`](Self::build) freezes the result.
///

#[derive(Debug)]
pub struct CatalogBuilder {
    layout: TableLayout,
    classes: Vec<ClassDecl>,
    delegates: Vec<DelegateDecl>,
    views: Vec<ViewDecl>,
}

impl CatalogBuilder {
    /// Start a catalog for one table, with the built-in delegates registered.
    #[must_use]
    pub fn new(layout: TableLayout) -> Self {
        Self {
            layout,
            classes: Vec::new(),
            delegates: vec![builtin::audit(), builtin::version()],
            views: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    #[must_use]
    pub fn delegate(mut self, delegate: DelegateDecl) -> Self {
        self.delegates.push(delegate);
        self
    }

    #[must_use]
    pub fn view(mut self, view: ViewDecl) -> Self {
        self.views.push(view);
        self
    }

    /// Freeze the declarations.
    ///
    /// Rejects an invalid layout and duplicate class, delegate or view names.
    pub fn build(self) -> Result<Catalog, Error> {
        self.layout.validate()?;

        let classes = index_by_name("class", self.classes, |c| &c.name)?;
        let delegates = index_by_name("delegate", self.delegates, |d| &d.name)?;
        let views = index_by_name("view", self.views, |v| &v.name)?;

        tracing::debug!(
            table = %self.layout.name,
            classes = classes.len(),
            delegates = delegates.len(),
            views = views.len(),
            "catalog frozen"
        );

        Ok(Catalog {
            layout: self.layout,
            classes,
            delegates,
            views,
        })
    }
}

fn index_by_name<T>(
    kind: &str,
    decls: Vec<T>,
    name: impl Fn(&T) -> &String,
) -> Result<BTreeMap<String, T>, Error> {
    let mut out = BTreeMap::new();

    for decl in decls {
        let key = name(&decl).clone();
        if key.is_empty() {
            return Err(Error::configuration(
                ErrorOrigin::Schema,
                format!("{kind} name is empty"),
            ));
        }
        if out.insert(key.clone(), decl).is_some() {
            return Err(Error::configuration(
                ErrorOrigin::Schema,
                format!("duplicate {kind} name '{key}'"),
            ));
        }
    }

    Ok(out)
}

///
/// Catalog
///
/// Immutable set of raw declarations for one table.
///

#[derive(Debug)]
pub struct Catalog {
    layout: TableLayout,
    classes: BTreeMap<String, ClassDecl>,
    delegates: BTreeMap<String, DelegateDecl>,
    views: BTreeMap<String, ViewDecl>,
}

impl Catalog {
    #[must_use]
    pub const fn layout(&self) -> &TableLayout {
        &self.layout
    }

    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn delegate(&self, name: &str) -> Option<&DelegateDecl> {
        self.delegates.get(name)
    }

    #[must_use]
    pub fn view(&self, name: &str) -> Option<&ViewDecl> {
        self.views.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    pub fn delegates(&self) -> impl Iterator<Item = &DelegateDecl> {
        self.delegates.values()
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewDecl> {
        self.views.values()
    }
}
