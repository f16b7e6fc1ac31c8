use crate::{
    expr::{Clause, ConditionKind, Expression},
    value::AttributeValue,
};
use std::collections::BTreeMap;

///
/// AliasCore
///
/// Placeholder bookkeeping for one builder instance. Name aliases are
/// memoised per attribute segment and value aliases per (path, value) pair,
/// so repeated references render identically.
///

#[derive(Clone, Debug, Default)]
pub struct AliasCore {
    names: BTreeMap<String, String>,
    values: Vec<ValueAlias>,
    clauses: Vec<Clause>,
}

#[derive(Clone, Debug)]
struct ValueAlias {
    path: String,
    value: AttributeValue,
    alias: String,
}

impl AliasCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Distinct dotted attribute paths referenced so far.
    pub fn attributes(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for clause in &self.clauses {
            let path = clause.path();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        paths
    }

    /// Alias for one attribute name segment.
    pub fn name_alias(&mut self, segment: &str) -> String {
        if let Some(alias) = self.names.get(segment) {
            return alias.clone();
        }

        let base = format!("#{}", sanitize(segment, "attr"));
        let alias = unique(base, |candidate| {
            self.names.values().any(|taken| taken == candidate)
        });
        self.names.insert(segment.to_string(), alias.clone());

        alias
    }

    /// Alias for a value tested against the attribute at `path`.
    pub fn value_alias(&mut self, path: &str, value: &AttributeValue) -> String {
        if let Some(existing) = self
            .values
            .iter()
            .find(|entry| entry.path == path && &entry.value == value)
        {
            return existing.alias.clone();
        }

        let base = format!(":{}", sanitize(path, "val"));
        let alias = unique(base, |candidate| {
            self.values.iter().any(|entry| entry.alias == candidate)
        });
        self.values.push(ValueAlias {
            path: path.to_string(),
            value: value.clone(),
            alias: alias.clone(),
        });

        alias
    }

    pub(crate) fn push(
        &mut self,
        kind: ConditionKind,
        attribute: &[&str],
        values: Vec<AttributeValue>,
    ) {
        let path = attribute.join(".");
        let name = attribute
            .iter()
            .map(|segment| self.name_alias(segment))
            .collect::<Vec<_>>()
            .join(".");
        let placeholders = values
            .iter()
            .map(|value| self.value_alias(&path, value))
            .collect::<Vec<_>>();

        self.clauses.push(Clause {
            kind,
            attribute: attribute.iter().map(ToString::to_string).collect(),
            values,
            text: render(kind, &name, &placeholders),
        });
    }

    #[must_use]
    pub fn build(&self) -> Expression {
        let text = self
            .clauses
            .iter()
            .map(|clause| clause.text.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");

        Expression {
            text,
            names: self
                .names
                .iter()
                .map(|(segment, alias)| (alias.clone(), segment.clone()))
                .collect(),
            values: self
                .values
                .iter()
                .map(|entry| (entry.alias.clone(), entry.value.clone()))
                .collect(),
            clauses: self.clauses.clone(),
        }
    }
}

fn sanitize(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

fn unique(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }

    let mut suffix = 2_usize;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn render(kind: ConditionKind, name: &str, values: &[String]) -> String {
    let first = values.first().map_or("", String::as_str);

    match kind {
        ConditionKind::Eq => format!("{name} = {first}"),
        ConditionKind::Ne => format!("{name} <> {first}"),
        ConditionKind::Le => format!("{name} <= {first}"),
        ConditionKind::Lt => format!("{name} < {first}"),
        ConditionKind::Ge => format!("{name} >= {first}"),
        ConditionKind::Gt => format!("{name} > {first}"),
        ConditionKind::NotNull => format!("attribute_exists({name})"),
        ConditionKind::Null => format!("attribute_not_exists({name})"),
        ConditionKind::Contains => format!("contains({name}, {first})"),
        ConditionKind::NotContains => format!("NOT contains({name}, {first})"),
        ConditionKind::BeginsWith => format!("begins_with({name}, {first})"),
        ConditionKind::In => format!("{name} IN ({})", values.join(", ")),
        ConditionKind::Between => format!(
            "{name} BETWEEN {first} AND {}",
            values.get(1).map_or("", String::as_str)
        ),
    }
}
