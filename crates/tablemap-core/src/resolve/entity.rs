use crate::{
    DEFAULT_FACET,
    error::{Error, ErrorOrigin},
    key::{KeyPath, KeyTemplate},
    model::{ColumnDef, EntityType, FacetType, IdentifierDef},
    path::PropertyPath,
    resolve::{Resolver, WireSet, delegate::callback_def},
    schema::{
        ClassDecl, ConverterRef, FacetDecl, IdentifierDecl, KeyOp, KeyPathDecl, KeyRole, KeyType,
    },
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

fn config(message: String) -> Error {
    Error::configuration(ErrorOrigin::Resolve, message)
}

impl<'a> Resolver<'a> {
    /// Flatten one concrete class.
    ///
    /// Contributions are collected own class first, then each ancestor in
    /// turn, so ancestor columns, identifiers and callbacks land after the
    /// class's own.
    pub(super) fn entity(&mut self, class: &'a ClassDecl) -> Result<EntityType, Error> {
        let chain = self.ancestry(class)?;
        let layout = self.catalog.layout();

        let mut wires = WireSet::new(&class.name);
        wires.reserve(&layout.type_column, "type discriminator");

        let mut identifiers = Vec::new();
        let mut columns = Vec::new();
        let mut callbacks = Vec::new();
        let mut filtered = BTreeSet::new();

        for decl in &chain {
            let mut contributed = decl
                .columns
                .iter()
                .map(|column| self.column(column, &decl.name))
                .collect::<Result<Vec<_>, _>>()?;
            let mut contributed_callbacks = decl
                .callbacks
                .iter()
                .map(|callback| callback_def(callback, &decl.name))
                .collect::<Vec<_>>();

            for link in &decl.delegates {
                let (linked_columns, linked_callbacks) = self.link(link, &mut Vec::new())?;
                contributed.extend(linked_columns);
                contributed_callbacks.extend(linked_callbacks);
            }

            for identifier in &decl.identifiers {
                let identifier = self.identifier(identifier, &decl.name)?;
                if filtered.contains(&identifier.column.wire_path()) {
                    continue;
                }
                wires.claim(&identifier.column)?;
                identifiers.push(identifier);
            }

            for column in contributed {
                if filtered.contains(&column.wire_path()) {
                    continue;
                }
                wires.claim(&column)?;
                columns.push(column);
            }

            callbacks.extend(contributed_callbacks);
            filtered.extend(decl.filtered.iter().cloned());
        }

        let (partition, sort) = split_identifiers(&class.name, identifiers)?;
        if layout.sort_key.is_some() && sort.is_none() {
            return Err(config(format!(
                "'{}': table '{}' has a sort key but the type declares no sort identifier",
                class.name, layout.name
            )));
        }

        let key_path = chain
            .iter()
            .find_map(|decl| decl.key_path.as_ref())
            .map(|decl| compile_key_path(&class.name, decl, sort.is_some()))
            .transpose()?;

        let mut key_exposure = BTreeMap::new();
        for decl in chain.iter().rev() {
            for property in &decl.internal {
                let column = find_column_mut(&mut columns, property).ok_or_else(|| {
                    config(format!(
                        "'{}' marks unknown property '{property}' internal",
                        decl.name
                    ))
                })?;
                column.internal = true;
            }
            for (property, exposed) in &decl.exposure {
                if let Some(column) = find_column_mut(&mut columns, property) {
                    column.exposed = *exposed;
                } else {
                    key_exposure.insert(property.clone(), *exposed);
                }
            }
        }

        let facets = self.facets(
            &class.name,
            &chain,
            sort.as_ref(),
            key_path.as_ref(),
            &mut columns,
            &mut wires,
        )?;

        let mut entity = EntityType {
            name: class.name.clone(),
            ancestors: chain.iter().skip(1).map(|decl| decl.name.clone()).collect(),
            partition,
            sort,
            columns,
            facets,
            callbacks,
            key_path,
            exposed: Vec::new(),
        };
        entity.exposed = exposed_properties(&entity, &key_exposure);

        tracing::debug!(
            entity = %entity.name,
            columns = entity.columns.len(),
            callbacks = entity.callbacks.len(),
            facets = entity.facets.len(),
            "entity type resolved"
        );

        Ok(entity)
    }

    /// The class followed by its ancestors, nearest first.
    fn ancestry(&self, class: &'a ClassDecl) -> Result<Vec<&'a ClassDecl>, Error> {
        let catalog = self.catalog;
        let mut chain = vec![class];
        let mut current = class;

        while let Some(parent) = &current.parent {
            if chain.iter().any(|decl| &decl.name == parent) {
                return Err(config(format!(
                    "'{}': inheritance cycle through '{parent}'",
                    class.name
                )));
            }

            let decl = catalog.class(parent).ok_or_else(|| {
                config(format!("'{}' extends unknown class '{parent}'", current.name))
            })?;
            chain.push(decl);
            current = decl;
        }

        Ok(chain)
    }

    fn identifier(&self, decl: &IdentifierDecl, owner: &str) -> Result<IdentifierDef, Error> {
        let layout = self.catalog.layout();
        let wire = match decl.role {
            KeyRole::Partition => layout.partition_key.as_str(),
            KeyRole::Sort => layout.sort_key.as_deref().ok_or_else(|| {
                config(format!(
                    "'{owner}' declares sort identifier '{}' but table '{}' has no sort key",
                    decl.property, layout.name
                ))
            })?,
        };

        Ok(IdentifierDef {
            column: ColumnDef {
                path: Arc::new(PropertyPath::new(None, &decl.property, wire)),
                converter: self.converter(&decl.converter, owner)?,
                required: true,
                internal: false,
                exposed: true,
                default: None,
                owner: owner.to_string(),
            },
            role: decl.role,
        })
    }

    // Default facet first, then declared facets with the nearest declaration
    // of a name winning. Index facets add their column to `columns`.
    fn facets(
        &self,
        type_name: &str,
        chain: &[&'a ClassDecl],
        sort: Option<&IdentifierDef>,
        key_path: Option<&KeyPath>,
        columns: &mut Vec<ColumnDef>,
        wires: &mut WireSet<'_>,
    ) -> Result<Vec<FacetType>, Error> {
        let sort_attribute = sort.map(|identifier| identifier.column.wire_path());
        let sort_template = key_path.and_then(|path| path.sk.clone());

        let mut declared: Vec<(&str, &FacetDecl)> = Vec::new();
        for decl in chain {
            for facet in &decl.facets {
                if !declared.iter().any(|(_, seen)| seen.name == facet.name) {
                    declared.push((&decl.name, facet));
                }
            }
        }

        let mut facets = Vec::new();
        if !declared.iter().any(|(_, facet)| facet.name == DEFAULT_FACET) {
            facets.push(FacetType {
                name: DEFAULT_FACET.to_string(),
                index: None,
                attribute: sort_attribute.clone(),
                column: None,
                template: sort_template.clone(),
                operator: KeyOp::BeginsWith,
            });
        }

        for (owner, decl) in declared {
            let template = decl
                .template
                .as_deref()
                .map(|source| template(type_name, source))
                .transpose()?;

            let Some(index) = &decl.index else {
                if sort_attribute.is_none() {
                    return Err(config(format!(
                        "'{type_name}': facet '{}' needs a sort identifier or an index",
                        decl.name
                    )));
                }
                facets.push(FacetType {
                    name: decl.name.clone(),
                    index: None,
                    attribute: sort_attribute.clone(),
                    column: None,
                    template: template.or_else(|| sort_template.clone()),
                    operator: decl.operator,
                });
                continue;
            };

            let slot = self.catalog.layout().get_local_index(index).ok_or_else(|| {
                config(format!(
                    "'{type_name}': facet '{}' references unknown local index '{index}'",
                    decl.name
                ))
            })?;
            let converter = match slot.key_type {
                KeyType::String => ConverterRef::String,
                KeyType::Number => ConverterRef::Number,
            };
            let property = decl.property.as_deref().unwrap_or(&decl.name);
            let column = ColumnDef {
                path: Arc::new(PropertyPath::new(None, property, &slot.attribute)),
                converter: self.converter(&converter, owner)?,
                required: false,
                internal: false,
                exposed: false,
                default: None,
                owner: owner.to_string(),
            };

            // a property already mapped to this slot's attribute is reused
            match columns.iter().find(|c| c.wire_path() == slot.attribute) {
                Some(existing) if existing.property() == property => {}
                _ => {
                    wires.claim(&column)?;
                    columns.push(column.clone());
                }
            }

            facets.push(FacetType {
                name: decl.name.clone(),
                index: Some(slot.name.clone()),
                attribute: Some(slot.attribute.clone()),
                column: Some(column),
                template,
                operator: decl.operator,
            });
        }

        Ok(facets)
    }
}

fn split_identifiers(
    type_name: &str,
    identifiers: Vec<IdentifierDef>,
) -> Result<(IdentifierDef, Option<IdentifierDef>), Error> {
    let (partitions, sorts): (Vec<_>, Vec<_>) = identifiers
        .into_iter()
        .partition(|identifier| identifier.role == KeyRole::Partition);

    let mut partitions = partitions.into_iter();
    let partition = partitions
        .next()
        .ok_or_else(|| config(format!("'{type_name}' declares no partition identifier")))?;
    if partitions.next().is_some() {
        return Err(config(format!(
            "'{type_name}' declares more than one partition identifier"
        )));
    }

    let mut sorts = sorts.into_iter();
    let sort = sorts.next();
    if sorts.next().is_some() {
        return Err(config(format!(
            "'{type_name}' declares more than one sort identifier"
        )));
    }

    Ok((partition, sort))
}

fn template(type_name: &str, source: &str) -> Result<KeyTemplate, Error> {
    KeyTemplate::new(source).map_err(|err| config(format!("'{type_name}': {err}")))
}

fn compile_key_path(
    type_name: &str,
    decl: &KeyPathDecl,
    has_sort: bool,
) -> Result<KeyPath, Error> {
    if decl.sk.is_some() && !has_sort {
        return Err(config(format!(
            "'{type_name}': key path has a sort template but no sort identifier"
        )));
    }

    let pk = template(type_name, &decl.pk)?;
    let sk = decl
        .sk
        .as_deref()
        .map(|source| template(type_name, source))
        .transpose()?;

    Ok(KeyPath::new(pk, sk))
}

fn find_column_mut<'c>(
    columns: &'c mut [ColumnDef],
    property: &str,
) -> Option<&'c mut ColumnDef> {
    columns
        .iter_mut()
        .find(|column| column.property() == property)
}

// Exposed columns in layout order, then key-path fields not marked hidden.
fn exposed_properties(
    entity: &EntityType,
    key_exposure: &BTreeMap<String, bool>,
) -> Vec<String> {
    let mut exposed = entity
        .all_columns()
        .filter(|column| column.exposed)
        .map(ColumnDef::property)
        .collect::<Vec<_>>();

    if let Some(key_path) = &entity.key_path {
        for field in key_path.fields() {
            let visible = key_exposure.get(field).copied().unwrap_or(true);
            if visible && !exposed.iter().any(|p| p == field) {
                exposed.push(field.to_string());
            }
        }
    }

    exposed
}
