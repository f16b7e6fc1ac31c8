use crate::{
    error::{Error, ErrorOrigin},
    expr::{AliasCore, ConditionKind, ExpressionBuilder},
};

/// Maximum distinct attributes a key condition may reference.
const KEY_CONDITION_ATTRIBUTES: usize = 2;

///
/// ConditionBuilder
///
/// Filter conditions applied to query results.
///

#[derive(Clone, Debug, Default)]
pub struct ConditionBuilder {
    core: AliasCore,
}

impl ConditionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionBuilder for ConditionBuilder {
    fn core(&self) -> &AliasCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AliasCore {
        &mut self.core
    }
}

///
/// ExpectedBuilder
///
/// Predicates attached to a conditional put or delete.
///

#[derive(Clone, Debug, Default)]
pub struct ExpectedBuilder {
    core: AliasCore,
}

impl ExpectedBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionBuilder for ExpectedBuilder {
    fn core(&self) -> &AliasCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AliasCore {
        &mut self.core
    }
}

///
/// KeyConditionBuilder
///
/// Key condition of a query: partition equality plus at most one sort-key
/// comparison.
///

#[derive(Clone, Debug, Default)]
pub struct KeyConditionBuilder {
    core: AliasCore,
}

impl KeyConditionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionBuilder for KeyConditionBuilder {
    fn core(&self) -> &AliasCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AliasCore {
        &mut self.core
    }

    fn admit(&self, kind: ConditionKind, attribute: &[&str]) -> Result<(), Error> {
        let supported = matches!(
            kind,
            ConditionKind::Eq
                | ConditionKind::Le
                | ConditionKind::Lt
                | ConditionKind::Ge
                | ConditionKind::Gt
                | ConditionKind::BeginsWith
                | ConditionKind::Between
        );
        if !supported {
            return Err(Error::validation(
                ErrorOrigin::Expression,
                format!("{kind} is not allowed in a key condition"),
            ));
        }

        let path = attribute.join(".");
        let mut attributes = self.core.attributes();
        if !attributes.contains(&path) {
            attributes.push(path);
        }
        if attributes.len() > KEY_CONDITION_ATTRIBUTES {
            return Err(Error::validation(
                ErrorOrigin::Expression,
                format!(
                    "key condition may reference at most {KEY_CONDITION_ATTRIBUTES} attributes, \
                     got {}",
                    attributes.join(", ")
                ),
            ));
        }

        Ok(())
    }
}
