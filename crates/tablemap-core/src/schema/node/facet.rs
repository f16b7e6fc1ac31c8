use std::fmt;

///
/// KeyOp
///
/// Comparison applied to the sort dimension of a facet or view query.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    #[default]
    BeginsWith,
}

impl fmt::Display for KeyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::BeginsWith => "begins_with",
        };
        write!(f, "{label}")
    }
}

///
/// FacetDecl
///
/// Alternate query path. Without an index the facet sorts on the entity's own
/// SK; with one, a facet column is written into that local index slot.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FacetDecl {
    pub name: String,
    pub index: Option<String>,
    /// Property that holds the facet key; the facet name when unset.
    pub property: Option<String>,
    /// Key template compiled into the facet column on every write.
    pub template: Option<String>,
    pub operator: KeyOp,
}

impl FacetDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            property: None,
            template: None,
            operator: KeyOp::default(),
        }
    }

    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub const fn operator(mut self, operator: KeyOp) -> Self {
        self.operator = operator;
        self
    }
}
