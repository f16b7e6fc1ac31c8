use crate::{
    error::{Error, ErrorOrigin},
    key::{KeyPath, KeyTemplate},
    model::{EntityType, ViewQuery, ViewSource, ViewType},
    resolve::{Resolver, WireSet},
    schema::ViewDecl,
};
use std::{collections::BTreeMap, sync::Arc};

impl Resolver<'_> {
    /// Resolve a view against its backing index and the already resolved
    /// entity types that feed it.
    pub(super) fn view(
        &self,
        decl: &ViewDecl,
        entities: &BTreeMap<String, Arc<EntityType>>,
    ) -> Result<ViewType, Error> {
        let invalid = |message: String| {
            Error::configuration(ErrorOrigin::Resolve, format!("view '{}': {message}", decl.name))
        };

        let layout = self.catalog.layout();
        let index = layout
            .get_view_index(&decl.index)
            .ok_or_else(|| invalid(format!("unknown view index '{}'", decl.index)))?;

        let mut wires = WireSet::new(&decl.name);
        wires.reserve(&layout.type_column, "type discriminator");
        wires.reserve(&index.partition_key, "view index");
        if let Some(sort_key) = &index.sort_key {
            wires.reserve(sort_key, "view index");
        }

        let mut columns = Vec::with_capacity(decl.columns.len());
        for column in &decl.columns {
            let column = self.column(column, &decl.name)?;
            wires.claim(&column)?;
            columns.push(column);
        }

        let key_path = |pk: &str, sk: Option<&str>| -> Result<KeyPath, Error> {
            if sk.is_some() && index.sort_key.is_none() {
                return Err(invalid(format!(
                    "index '{}' has no sort key for template '{}'",
                    index.name,
                    sk.unwrap_or_default()
                )));
            }
            let compile =
                |source: &str| KeyTemplate::new(source).map_err(|err| invalid(err.to_string()));

            Ok(KeyPath::new(compile(pk)?, sk.map(compile).transpose()?))
        };

        let mut queries: Vec<ViewQuery> = Vec::with_capacity(decl.queries.len());
        for query in &decl.queries {
            if queries.iter().any(|seen| seen.name == query.name) {
                return Err(invalid(format!("duplicate query '{}'", query.name)));
            }
            queries.push(ViewQuery {
                name: query.name.clone(),
                key_path: key_path(&query.pk, query.sk.as_deref())?,
                operator: query.operator,
            });
        }

        let mut sources = BTreeMap::new();
        for source in &decl.sources {
            if !entities.contains_key(&source.type_name) {
                return Err(invalid(format!(
                    "source '{}' is not a concrete entity type",
                    source.type_name
                )));
            }
            if sources.contains_key(&source.type_name) {
                return Err(invalid(format!("duplicate source '{}'", source.type_name)));
            }
            sources.insert(
                source.type_name.clone(),
                ViewSource {
                    type_name: source.type_name.clone(),
                    key_path: key_path(&source.pk, source.sk.as_deref())?,
                },
            );
        }

        tracing::debug!(
            view = %decl.name,
            index = %index.name,
            queries = queries.len(),
            sources = sources.len(),
            "view type resolved"
        );

        Ok(ViewType {
            name: decl.name.clone(),
            index: index.clone(),
            columns,
            queries,
            sources,
        })
    }
}
