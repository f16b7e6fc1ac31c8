//! Write pipeline.
//!
//! Turns an entity document into a wire item in fixed phases: internal
//! guard, default fill, callbacks, key compilation, column extraction, view
//! projection, and the type discriminator. Each phase is a method so the
//! session can stop after the ones an operation needs.
use crate::{
    context::SessionContext,
    db::expected::Expected,
    error::{Error, ErrorOrigin},
    expr::{ConditionKind, ExpectedBuilder, Expression, ExpressionBuilder},
    key::KeyPathError,
    model::{ColumnDef, EntityType},
    path::AccessOptions,
    resolve::TypeCatalog,
    schema::{CallbackContext, ExpectedValue, Operation},
    value::{AttributeValue, Document, Item, is_set},
};
use serde_json::Value as JsonValue;

///
/// WritePlan
///

#[derive(Debug)]
pub(crate) struct WritePlan {
    pub(crate) document: Document,
    pub(crate) item: Item,
    pub(crate) key: Item,
    pub(crate) expected: Vec<ExpectedValue>,
    /// Wire values of internal columns as the caller last saw them; `None`
    /// for a column the caller's copy does not hold.
    pub(crate) snapshot: Vec<(ColumnDef, Option<AttributeValue>)>,
}

///
/// Writer
///

pub(crate) struct Writer<'a> {
    catalog: &'a TypeCatalog,
    entity: &'a EntityType,
    session: &'a SessionContext,
}

impl<'a> Writer<'a> {
    pub(crate) const fn new(
        catalog: &'a TypeCatalog,
        entity: &'a EntityType,
        session: &'a SessionContext,
    ) -> Self {
        Self {
            catalog,
            entity,
            session,
        }
    }

    /// Run every phase for an insert or update.
    pub(crate) fn plan(
        &self,
        operation: Operation,
        mut document: Document,
    ) -> Result<WritePlan, Error> {
        if operation == Operation::Insert {
            self.guard_internal(&mut document)?;
        }
        let snapshot = if operation == Operation::Update {
            self.snapshot_internal(&mut document)?
        } else {
            Vec::new()
        };

        self.fill_defaults(&mut document)?;
        let expected = self.run_callbacks(operation, &mut document)?;
        self.compile_keys(&mut document)?;

        let mut item = self.extract(&mut document)?;
        self.project_views(&document, &mut item);
        item.insert(
            self.catalog.layout().type_column.clone(),
            AttributeValue::S(self.entity.name.clone()),
        );
        let key = self.key_of(&item)?;

        Ok(WritePlan {
            document,
            item,
            key,
            expected,
            snapshot,
        })
    }

    /// Callbacks and keys only; a delete never writes columns.
    pub(crate) fn plan_delete(&self, mut document: Document) -> Result<WritePlan, Error> {
        let expected = self.run_callbacks(Operation::Delete, &mut document)?;
        let key = self.key(&mut document)?;

        Ok(WritePlan {
            document,
            item: key.clone(),
            key,
            expected,
            snapshot: Vec::new(),
        })
    }

    /// Compile keys into `document` and return the primary key item.
    pub(crate) fn key(&self, document: &mut Document) -> Result<Item, Error> {
        self.compile_keys(document)?;

        let mut key = Item::new();
        for identifier in self.entity.identifiers() {
            let column = &identifier.column;
            let Some(value) = column.read(document, AccessOptions::read())? else {
                return Err(self.missing(column));
            };
            column.write_item(&mut key, Some(value), AccessOptions::write())?;
        }

        Ok(key)
    }

    pub(crate) fn create_condition(&self) -> Result<Expression, Error> {
        let mut builder = ExpectedBuilder::new();
        for identifier in self.entity.identifiers() {
            builder.null(&identifier.column)?;
        }

        Ok(builder.build())
    }

    pub(crate) fn update_condition(
        &self,
        plan: &WritePlan,
        expected: Option<&Expected>,
    ) -> Result<Expression, Error> {
        let mut builder = ExpectedBuilder::new();
        builder.not_null(&self.entity.partition.column)?;
        for (column, value) in &plan.snapshot {
            match value {
                Some(value) => {
                    builder.apply_wire(ConditionKind::Eq, column, vec![value.clone()])?;
                }
                None => {
                    builder.null(column)?;
                }
            }
        }
        self.expectations(&mut builder, plan, expected)?;

        Ok(builder.build())
    }

    pub(crate) fn delete_condition(
        &self,
        plan: &WritePlan,
        expected: Option<&Expected>,
    ) -> Result<Expression, Error> {
        let mut builder = ExpectedBuilder::new();
        self.expectations(&mut builder, plan, expected)?;

        Ok(builder.build())
    }

    // Internal columns are engine-managed; a create must not carry them.
    fn guard_internal(&self, document: &mut Document) -> Result<(), Error> {
        for column in self.entity.all_columns().filter(|column| column.internal) {
            if column.read(document, AccessOptions::read())?.is_some() {
                return Err(Error::validation(
                    ErrorOrigin::Manager,
                    format!(
                        "'{}.{}' is internal and cannot be set on create",
                        self.entity.name,
                        column.property()
                    ),
                ));
            }
        }

        Ok(())
    }

    fn snapshot_internal(
        &self,
        document: &mut Document,
    ) -> Result<Vec<(ColumnDef, Option<AttributeValue>)>, Error> {
        let mut snapshot = Vec::new();
        for column in self.entity.all_columns().filter(|column| column.internal) {
            let wire = column
                .read(document, AccessOptions::read())?
                .map(|value| column.converter.to_wire(&value))
                .transpose()?;
            snapshot.push((column.clone(), wire));
        }

        Ok(snapshot)
    }

    fn fill_defaults(&self, document: &mut Document) -> Result<(), Error> {
        for column in self.entity.all_columns() {
            let Some(default) = &column.default else {
                continue;
            };
            if column.read(document, AccessOptions::read())?.is_none() {
                let value = default.supply(self.session);
                column.write(document, Some(value), AccessOptions::write())?;
            }
        }

        Ok(())
    }

    fn run_callbacks(
        &self,
        operation: Operation,
        document: &mut Document,
    ) -> Result<Vec<ExpectedValue>, Error> {
        let mut expected = Vec::new();

        for def in &self.entity.callbacks {
            let mut ctx = CallbackContext::new(
                operation,
                self.session,
                &mut *document,
                def.root.clone(),
                &mut expected,
            );
            def.callback.call(&mut ctx).inspect_err(|err| {
                tracing::debug!(
                    entity = %self.entity.name,
                    callback = %def.name,
                    %operation,
                    error = %err,
                    "callback failed"
                );
            })?;
        }

        Ok(expected)
    }

    fn compile_keys(&self, document: &mut Document) -> Result<(), Error> {
        if let Some(key_path) = &self.entity.key_path {
            let pk = key_path.compile_pk(&*document).map(Some);
            assign(&self.entity.partition.column, document, pk)?;

            if let Some(sort) = &self.entity.sort {
                let sk = key_path.compile_sk(&*document);
                assign(&sort.column, document, sk)?;
            }
        }

        for facet in &self.entity.facets {
            let (Some(column), Some(template)) = (&facet.column, &facet.template) else {
                continue;
            };
            match template.compile(&*document) {
                Ok(raw) => {
                    let value = key_operand(column, raw)?;
                    column.write(document, Some(value), AccessOptions::write())?;
                }
                // sparse index: rows without the fields stay out of it
                Err(KeyPathError::MissingValue { .. }) => {
                    column.write(document, None, AccessOptions::write())?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    fn extract(&self, document: &mut Document) -> Result<Item, Error> {
        let mut item = Item::new();

        for column in self.entity.all_columns() {
            match column.read(document, AccessOptions::read())? {
                Some(value) => column.write_item(&mut item, Some(value), AccessOptions::write())?,
                None if column.required => return Err(self.missing(column)),
                None => {}
            }
        }

        Ok(item)
    }

    fn project_views(&self, document: &Document, item: &mut Item) {
        for view in self.catalog.views_for(&self.entity.name) {
            let Some(source) = view.source(&self.entity.name) else {
                continue;
            };
            let index = &view.index;
            let compiled = source
                .key_path
                .compile_pk(document)
                .and_then(|pk| Ok((pk, source.key_path.compile_sk(document)?)));

            match compiled {
                Ok((pk, sk)) => {
                    item.insert(index.partition_key.clone(), AttributeValue::S(pk));
                    if let (Some(attribute), Some(sk)) = (&index.sort_key, sk) {
                        item.insert(attribute.clone(), AttributeValue::S(sk));
                    }
                }
                Err(err) => {
                    item.remove(&index.partition_key);
                    if let Some(attribute) = &index.sort_key {
                        item.remove(attribute);
                    }
                    tracing::debug!(
                        view = %view.name,
                        entity = %self.entity.name,
                        error = %err,
                        "view keys cleared"
                    );
                }
            }
        }
    }

    fn key_of(&self, item: &Item) -> Result<Item, Error> {
        let mut key = Item::new();
        for identifier in self.entity.identifiers() {
            let wire = identifier.column.wire_path();
            let value = item
                .get(&wire)
                .ok_or_else(|| self.missing(&identifier.column))?;
            key.insert(wire, value.clone());
        }

        Ok(key)
    }

    fn expectations(
        &self,
        builder: &mut ExpectedBuilder,
        plan: &WritePlan,
        expected: Option<&Expected>,
    ) -> Result<(), Error> {
        if let Some(expected) = expected {
            if let Some(type_name) = &expected.type_name {
                if *type_name != self.entity.name {
                    return Err(Error::validation(
                        ErrorOrigin::Manager,
                        format!(
                            "expectations for '{type_name}' cannot guard '{}'",
                            self.entity.name
                        ),
                    ));
                }
            }
            for (property, value) in &expected.fields {
                self.expect(builder, property, value.clone())?;
            }
        }

        for value in &plan.expected {
            self.expect(builder, &value.property, value.value.clone())?;
        }

        Ok(())
    }

    fn expect(
        &self,
        builder: &mut ExpectedBuilder,
        property: &str,
        value: Option<JsonValue>,
    ) -> Result<(), Error> {
        let column = self.entity.column(property).ok_or_else(|| {
            Error::validation(
                ErrorOrigin::Manager,
                format!("'{}' has no property '{property}'", self.entity.name),
            )
        })?;
        builder.eq(column, value)?;

        Ok(())
    }

    fn missing(&self, column: &ColumnDef) -> Error {
        Error::validation(
            ErrorOrigin::Manager,
            format!(
                "'{}': required property '{}' has no value",
                self.entity.name,
                column.property()
            ),
        )
    }
}

// A compiled key wins. When the template lacks a field, an identifier the
// caller already supplied is kept.
fn assign(
    column: &ColumnDef,
    document: &mut Document,
    compiled: Result<Option<String>, KeyPathError>,
) -> Result<(), Error> {
    match compiled {
        Ok(Some(key)) => {
            column.write(document, Some(JsonValue::String(key)), AccessOptions::write())
        }
        Ok(None) => Ok(()),
        Err(err @ KeyPathError::MissingValue { .. }) => {
            if is_set(column.read(document, AccessOptions::read())?.as_ref()) {
                Ok(())
            } else {
                Err(err.into())
            }
        }
        Err(err) => Err(err.into()),
    }
}

/// Shape a compiled key string for `column`: numeric index slots take numbers.
pub(crate) fn key_operand(column: &ColumnDef, raw: String) -> Result<JsonValue, Error> {
    if column.converter.name() != "number" {
        return Ok(JsonValue::String(raw));
    }

    raw.parse::<serde_json::Number>()
        .map(JsonValue::Number)
        .map_err(|_| {
            Error::validation(
                ErrorOrigin::Key,
                format!("key '{raw}' for '{}' is not a number", column.wire_path()),
            )
        })
}
