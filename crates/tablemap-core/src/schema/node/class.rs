use crate::schema::node::{CallbackDecl, ColumnDecl, DelegateLink, FacetDecl, IdentifierDecl};

///
/// KeyPathDecl
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPathDecl {
    pub pk: String,
    pub sk: Option<String>,
}

impl KeyPathDecl {
    #[must_use]
    pub fn new(pk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: None,
        }
    }

    #[must_use]
    pub fn sk(mut self, template: impl Into<String>) -> Self {
        self.sk = Some(template.into());
        self
    }
}

///
/// ClassDecl
///
/// Raw per-class declarations. Inheritance is an explicit `parent` name;
/// abstract classes contribute to descendants but get no entity type.
///

#[derive(Clone, Debug, Default)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub is_abstract: bool,
    pub columns: Vec<ColumnDecl>,
    pub identifiers: Vec<IdentifierDecl>,
    pub callbacks: Vec<CallbackDecl>,
    pub delegates: Vec<DelegateLink>,
    pub facets: Vec<FacetDecl>,
    pub key_path: Option<KeyPathDecl>,

    /// Property paths forced internal.
    pub internal: Vec<String>,
    /// Property paths with an explicit exposure mark.
    pub exposure: Vec<(String, bool)>,
    /// Ancestor column attributes this class drops.
    pub filtered: Vec<String>,
}

impl ClassDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn identifier(mut self, identifier: IdentifierDecl) -> Self {
        self.identifiers.push(identifier);
        self
    }

    #[must_use]
    pub fn callback(mut self, callback: CallbackDecl) -> Self {
        self.callbacks.push(callback);
        self
    }

    #[must_use]
    pub fn delegate(mut self, link: DelegateLink) -> Self {
        self.delegates.push(link);
        self
    }

    #[must_use]
    pub fn facet(mut self, facet: FacetDecl) -> Self {
        self.facets.push(facet);
        self
    }

    #[must_use]
    pub fn key_path(mut self, key_path: KeyPathDecl) -> Self {
        self.key_path = Some(key_path);
        self
    }

    #[must_use]
    pub fn internal(mut self, property: impl Into<String>) -> Self {
        self.internal.push(property.into());
        self
    }

    #[must_use]
    pub fn expose(mut self, property: impl Into<String>, exposed: bool) -> Self {
        self.exposure.push((property.into(), exposed));
        self
    }

    #[must_use]
    pub fn filter(mut self, wire: impl Into<String>) -> Self {
        self.filtered.push(wire.into());
        self
    }
}
