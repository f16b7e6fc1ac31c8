use crate::{
    DEFAULT_TYPE_COLUMN, MAX_LOCAL_INDEXES,
    error::{Error, ErrorOrigin},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// KeyType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    #[default]
    String,
    Number,
}

///
/// Projection
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    All,
    KeysOnly,
    Include(Vec<String>),
}

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Local,
    Global,
}

///
/// LocalIndexSlot
///
/// One local secondary index: same partition key as the table, an alternate
/// sort attribute.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LocalIndexSlot {
    pub name: String,
    pub attribute: String,

    #[serde(default)]
    pub key_type: KeyType,

    #[serde(default)]
    pub projection: Projection,
}

impl LocalIndexSlot {
    #[must_use]
    pub fn new(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            key_type: KeyType::String,
            projection: Projection::All,
        }
    }

    #[must_use]
    pub const fn key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

///
/// IndexLayout
///
/// Index backing a view. Local view indexes share the table partition key.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexLayout {
    pub name: String,
    pub kind: IndexKind,
    pub partition_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,

    #[serde(default)]
    pub projection: Projection,
}

impl IndexLayout {
    #[must_use]
    pub fn global(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IndexKind::Global,
            partition_key: partition_key.into(),
            sort_key: None,
            projection: Projection::All,
        }
    }

    #[must_use]
    pub fn local(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            kind: IndexKind::Local,
            ..Self::global(name, partition_key)
        }
    }

    #[must_use]
    pub fn sort_key(mut self, attribute: impl Into<String>) -> Self {
        self.sort_key = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

///
/// TableLayout
///
/// Physical shape of the single table every entity type maps onto.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableLayout {
    pub name: String,
    pub partition_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,

    #[serde(default = "default_type_column")]
    pub type_column: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_indexes: Vec<LocalIndexSlot>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub view_indexes: Vec<IndexLayout>,
}

fn default_type_column() -> String {
    DEFAULT_TYPE_COLUMN.to_string()
}

impl TableLayout {
    #[must_use]
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            type_column: default_type_column(),
            local_indexes: Vec::new(),
            view_indexes: Vec::new(),
        }
    }

    #[must_use]
    pub fn sort_key(mut self, attribute: impl Into<String>) -> Self {
        self.sort_key = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn type_column(mut self, attribute: impl Into<String>) -> Self {
        self.type_column = attribute.into();
        self
    }

    #[must_use]
    pub fn local_index(mut self, slot: LocalIndexSlot) -> Self {
        self.local_indexes.push(slot);
        self
    }

    #[must_use]
    pub fn view_index(mut self, index: IndexLayout) -> Self {
        self.view_indexes.push(index);
        self
    }

    #[must_use]
    pub fn get_local_index(&self, name: &str) -> Option<&LocalIndexSlot> {
        self.local_indexes.iter().find(|slot| slot.name == name)
    }

    #[must_use]
    pub fn get_view_index(&self, name: &str) -> Option<&IndexLayout> {
        self.view_indexes.iter().find(|index| index.name == name)
    }

    /// Key attributes (partition, then sort) of the named index, or of the
    /// table itself for `None`.
    #[must_use]
    pub fn key_attributes(&self, index: Option<&str>) -> Option<(&str, Option<&str>)> {
        let Some(index) = index else {
            return Some((&self.partition_key, self.sort_key.as_deref()));
        };

        if let Some(slot) = self.get_local_index(index) {
            return Some((&self.partition_key, Some(&slot.attribute)));
        }

        self.get_view_index(index)
            .map(|layout| (layout.partition_key.as_str(), layout.sort_key.as_deref()))
    }

    /// Check the layout's own consistency.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| {
            Error::configuration(ErrorOrigin::Schema, format!("table '{}': {message}", self.name))
        };

        if self.partition_key.is_empty() {
            return Err(invalid("partition key attribute is empty".to_string()));
        }
        if self.local_indexes.len() > MAX_LOCAL_INDEXES {
            return Err(invalid(format!(
                "{} local indexes declared (max {MAX_LOCAL_INDEXES})",
                self.local_indexes.len()
            )));
        }
        if !self.local_indexes.is_empty() && self.sort_key.is_none() {
            return Err(invalid("local indexes require a table sort key".to_string()));
        }

        let mut names = BTreeSet::new();
        let index_names = self
            .local_indexes
            .iter()
            .map(|slot| &slot.name)
            .chain(self.view_indexes.iter().map(|index| &index.name));
        for name in index_names {
            if !names.insert(name) {
                return Err(invalid(format!("duplicate index name '{name}'")));
            }
        }

        for index in &self.view_indexes {
            if index.kind == IndexKind::Local && index.partition_key != self.partition_key {
                return Err(invalid(format!(
                    "local index '{}' must share partition key '{}'",
                    index.name, self.partition_key
                )));
            }
        }

        let mut attributes = BTreeSet::from([self.partition_key.as_str()]);
        let reserved = self
            .sort_key
            .iter()
            .map(String::as_str)
            .chain([self.type_column.as_str()]);
        for attribute in reserved {
            if !attributes.insert(attribute) {
                return Err(invalid(format!("attribute '{attribute}' is used twice")));
            }
        }

        Ok(())
    }
}
