use crate::schema::node::{ColumnDecl, KeyOp};

///
/// ViewQueryDecl
///
/// Named query over a view index. Templates compile from the view instance.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewQueryDecl {
    pub name: String,
    pub pk: String,
    pub sk: Option<String>,
    pub operator: KeyOp,
}

impl ViewQueryDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, pk: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pk: pk.into(),
            sk: None,
            operator: KeyOp::default(),
        }
    }

    #[must_use]
    pub fn sk(mut self, template: impl Into<String>) -> Self {
        self.sk = Some(template.into());
        self
    }

    #[must_use]
    pub const fn operator(mut self, operator: KeyOp) -> Self {
        self.operator = operator;
        self
    }
}

///
/// ViewSourceDecl
///
/// How rows of one entity type populate the view index keys. Templates
/// compile from the entity document.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewSourceDecl {
    pub type_name: String,
    pub pk: String,
    pub sk: Option<String>,
}

impl ViewSourceDecl {
    #[must_use]
    pub fn new(type_name: impl Into<String>, pk: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
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
/// ViewDecl
///

#[derive(Clone, Debug)]
pub struct ViewDecl {
    pub name: String,
    pub index: String,
    /// Payload columns read back from the projected row.
    pub columns: Vec<ColumnDecl>,
    pub queries: Vec<ViewQueryDecl>,
    pub sources: Vec<ViewSourceDecl>,
}

impl ViewDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
            columns: Vec::new(),
            queries: Vec::new(),
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn query(mut self, query: ViewQueryDecl) -> Self {
        self.queries.push(query);
        self
    }

    #[must_use]
    pub fn source(mut self, source: ViewSourceDecl) -> Self {
        self.sources.push(source);
        self
    }
}
