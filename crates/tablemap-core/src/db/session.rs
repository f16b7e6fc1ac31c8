use crate::{
    DEFAULT_FACET,
    context::SessionContext,
    convert::StringConverter,
    db::{
        cursor::ResultCursor,
        expected::Expected,
        manager::EntityManager,
        middleware::WriteRequest,
        rehydrate,
        store::{DeleteRequest, GetRequest, PutRequest, QueryRequest},
        write::{Writer, key_operand},
    },
    error::{Error, ErrorOrigin},
    expr::{ConditionBuilder, ConditionKind, ExpressionBuilder, KeyConditionBuilder},
    model::{ColumnDef, EntityType, FacetType},
    obs::{CallEvent, CallKind, OperationKind, Recorder},
    path::AccessOptions,
    schema::{KeyOp, Operation},
    traits::{Entity, View},
    value::{Document, Item, render_key},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;
use std::sync::Arc;

///
/// Order
///
/// Direction of a view query over its sort key.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

///
/// Session
///
/// One caller's view of an [`EntityManager`]. The session context feeds
/// callbacks, default values and middleware.
///

#[derive(Debug)]
pub struct Session<'m> {
    manager: &'m EntityManager,
    context: SessionContext,
}

impl<'m> Session<'m> {
    pub(crate) const fn new(manager: &'m EntityManager, context: SessionContext) -> Self {
        Self { manager, context }
    }

    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    //
    // CRUD
    //

    /// Load the stored row addressed by `entity`'s keys.
    pub async fn get<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let recorder = self.start(OperationKind::Get, E::TYPE_NAME);
        let result = self.fetch(entity).await;

        finish(&recorder, OperationKind::Get, E::TYPE_NAME, result)
    }

    /// Insert `entity`; fails with a condition error when the row exists.
    pub async fn create<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let recorder = self.start(OperationKind::Create, E::TYPE_NAME);
        let result = self.insert(entity).await;

        finish(&recorder, OperationKind::Create, E::TYPE_NAME, result)
    }

    /// Replace the stored row. Internal columns the caller holds must still
    /// match the store, as must every field in `expected`.
    pub async fn update<E: Entity>(
        &self,
        entity: &E,
        expected: Option<&Expected>,
    ) -> Result<E, Error> {
        let recorder = self.start(OperationKind::Update, E::TYPE_NAME);
        let result = self.replace(entity, expected).await;

        finish(&recorder, OperationKind::Update, E::TYPE_NAME, result)
    }

    pub async fn delete<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        self.delete_expecting(entity, None).await
    }

    /// Delete guarded by caller expectations plus any predicates the
    /// entity's callbacks add. Returns the removed row when the store
    /// reports one.
    pub async fn delete_expecting<E: Entity>(
        &self,
        entity: &E,
        expected: Option<&Expected>,
    ) -> Result<E, Error> {
        let recorder = self.start(OperationKind::Delete, E::TYPE_NAME);
        let result = self.remove(entity, expected).await;

        finish(&recorder, OperationKind::Delete, E::TYPE_NAME, result)
    }

    //
    // Queries
    //

    /// Query the partition of `entity` through a facet (`default` when
    /// `facet` is `None`). Only rows of `E`'s type are returned.
    pub fn query_facet<E: Entity>(
        &self,
        entity: &E,
        facet: Option<&str>,
    ) -> Result<ResultCursor<E>, Error> {
        let recorder = self.start(OperationKind::QueryFacet, E::TYPE_NAME);
        let result = self.facet_cursor(entity, facet, recorder.clone());

        finish(&recorder, OperationKind::QueryFacet, E::TYPE_NAME, result)
    }

    /// Run a named query of view `V`, keyed from the fields of `view`.
    pub fn query_view<V: View>(
        &self,
        view: &V,
        query: &str,
        order: Option<Order>,
    ) -> Result<ResultCursor<V>, Error> {
        let recorder = self.start(OperationKind::QueryView, V::VIEW_NAME);
        let result = self.view_cursor(view, query, order, recorder.clone());

        finish(&recorder, OperationKind::QueryView, V::VIEW_NAME, result)
    }

    /// The exposed properties of `entity`, as a document.
    pub fn expose<E: Entity>(&self, entity: &E) -> Result<Document, Error> {
        let ty = self.entity_type::<E>()?;
        let mut document = to_document(entity, E::TYPE_NAME)?;
        let mut exposed = Document::new();

        for property in &ty.exposed {
            if let Some(column) = ty.column(property) {
                if let Some(value) = column.read(&mut document, AccessOptions::read())? {
                    column.write(&mut exposed, Some(value), AccessOptions::write())?;
                }
            } else if let Some(value) = document.get(property).filter(|value| !value.is_null()) {
                exposed.insert(property.clone(), value.clone());
            }
        }

        Ok(exposed)
    }

    //
    // Operation bodies
    //

    async fn fetch<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let ty = self.entity_type::<E>()?;
        let mut document = to_document(entity, E::TYPE_NAME)?;
        let key = self.writer(&ty).key(&mut document)?;

        let request = GetRequest {
            table: self.table(),
            key: key.clone(),
            consistent_read: self.manager.settings().consistent_read,
        };
        if self.manager.settings().debug {
            tracing::debug!(table = %request.table, key = %render_key(&key), "get");
        }
        self.store_call(CallKind::Get, None);

        let item = self
            .manager
            .store()
            .get(request)
            .await
            .map_err(Error::from_store)?
            .ok_or_else(|| Error::not_found(E::TYPE_NAME, render_key(&key)))?;

        self.load(&ty, item)
    }

    async fn insert<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let ty = self.entity_type::<E>()?;
        let writer = self.writer(&ty);
        let plan = writer.plan(Operation::Insert, to_document(entity, E::TYPE_NAME)?)?;
        let condition = writer.create_condition()?;

        let request = WriteRequest::Put(PutRequest {
            table: self.table(),
            item: plan.item.clone(),
            condition: condition.non_empty(),
        });
        let written = self.dispatch(request).await?;

        self.load(&ty, written.unwrap_or(plan.item))
    }

    async fn replace<E: Entity>(
        &self,
        entity: &E,
        expected: Option<&Expected>,
    ) -> Result<E, Error> {
        let ty = self.entity_type::<E>()?;
        let writer = self.writer(&ty);
        let plan = writer.plan(Operation::Update, to_document(entity, E::TYPE_NAME)?)?;
        let condition = writer.update_condition(&plan, expected)?;

        let request = WriteRequest::Put(PutRequest {
            table: self.table(),
            item: plan.item.clone(),
            condition: condition.non_empty(),
        });
        let written = self.dispatch(request).await?;

        self.load(&ty, written.unwrap_or(plan.item))
    }

    async fn remove<E: Entity>(
        &self,
        entity: &E,
        expected: Option<&Expected>,
    ) -> Result<E, Error> {
        let ty = self.entity_type::<E>()?;
        let writer = self.writer(&ty);
        let plan = writer.plan_delete(to_document(entity, E::TYPE_NAME)?)?;
        let condition = writer.delete_condition(&plan, expected)?;

        let request = WriteRequest::Delete(DeleteRequest {
            table: self.table(),
            key: plan.key.clone(),
            condition: condition.non_empty(),
        });

        match self.dispatch(request).await? {
            Some(old) => self.load(&ty, old),
            None => from_document(plan.document, E::TYPE_NAME),
        }
    }

    fn facet_cursor<E: Entity>(
        &self,
        entity: &E,
        facet: Option<&str>,
        recorder: Recorder,
    ) -> Result<ResultCursor<E>, Error> {
        let ty = Arc::clone(self.entity_type::<E>()?);
        let name = facet.unwrap_or(DEFAULT_FACET);
        let facet = ty.facet(name).ok_or_else(|| {
            Error::configuration(
                ErrorOrigin::Manager,
                format!("'{}' has no facet '{name}'", ty.name),
            )
        })?;
        let mut document = to_document(entity, E::TYPE_NAME)?;

        let mut keys = KeyConditionBuilder::new();
        let partition = partition_value(&ty, &mut document)?;
        keys.eq(&ty.partition.column, partition)?;

        if let Some(column) = sort_column(&ty, facet) {
            if let Some(value) = sort_value(facet, column, &mut document)? {
                keys.apply(condition_kind(facet.operator), column, value)?;
            }
        }

        let mut filter = ConditionBuilder::new();
        filter.eq(&self.type_column(), E::TYPE_NAME)?;

        let request = QueryRequest {
            table: self.table(),
            index: facet.index.clone(),
            key_condition: keys.build(),
            filter: filter.build().non_empty(),
            limit: self.manager.settings().page_size,
            scan_forward: true,
            start_key: None,
            consistent_read: self.manager.settings().consistent_read,
        };
        self.log_query(&request);

        let type_column = self.manager.catalog().layout().type_column.clone();
        let decode = move |item: Item| {
            rehydrate::entity(&ty, &type_column, item)
                .and_then(|document| from_document(document, E::TYPE_NAME))
        };

        Ok(ResultCursor::new(self.manager.store(), request, decode, recorder))
    }

    fn view_cursor<V: View>(
        &self,
        view: &V,
        query: &str,
        order: Option<Order>,
        recorder: Recorder,
    ) -> Result<ResultCursor<V>, Error> {
        let ty = Arc::clone(self.manager.catalog().view(V::VIEW_NAME)?);
        let named = ty.query(query).ok_or_else(|| {
            Error::configuration(
                ErrorOrigin::Manager,
                format!("view '{}' has no query '{query}'", ty.name),
            )
        })?;
        let document = to_document(view, V::VIEW_NAME)?;

        let mut keys = KeyConditionBuilder::new();
        let pk = named.key_path.compile_pk(&document)?;
        keys.eq(&string_column(&ty.index.partition_key), pk)?;

        if let Some(attribute) = &ty.index.sort_key {
            let sk = if named.operator == KeyOp::BeginsWith {
                named
                    .key_path
                    .compile_sk_prefix(&document)?
                    .filter(|prefix| !prefix.is_empty())
            } else {
                named.key_path.compile_sk(&document)?
            };
            if let Some(sk) = sk {
                keys.apply(condition_kind(named.operator), &string_column(attribute), sk)?;
            }
        }

        let request = QueryRequest {
            table: self.table(),
            index: Some(ty.index.name.clone()),
            key_condition: keys.build(),
            filter: None,
            limit: self.manager.settings().page_size,
            scan_forward: order != Some(Order::Descending),
            start_key: None,
            consistent_read: false,
        };
        self.log_query(&request);

        let type_column = self.manager.catalog().layout().type_column.clone();
        let decode = move |item: Item| {
            rehydrate::view(&ty, &type_column, item)
                .and_then(|document| from_document(document, V::VIEW_NAME))
        };

        Ok(ResultCursor::new(self.manager.store(), request, decode, recorder))
    }

    //
    // Dispatch
    //

    // Middleware runs in registration order, then the request goes out.
    // Returns the written item for a put and the old row for a delete.
    async fn dispatch(&self, mut request: WriteRequest) -> Result<Option<Item>, Error> {
        for middleware in self.manager.middleware_chain() {
            middleware
                .apply(&mut request, &self.context)
                .inspect_err(|err| {
                    tracing::debug!(
                        middleware = middleware.name(),
                        error = %err,
                        "write rejected by middleware"
                    );
                })?;
        }

        let store = self.manager.store();
        match request {
            WriteRequest::Put(put) => {
                if self.manager.settings().debug {
                    tracing::debug!(
                        table = %put.table,
                        key = %render_key(&put.item),
                        condition = put.condition.as_ref().map_or("", |c| c.text.as_str()),
                        "put"
                    );
                }
                self.store_call(CallKind::Put, None);

                let item = put.item.clone();
                store.put(put).await.map_err(Error::from_store)?;

                Ok(Some(item))
            }
            WriteRequest::Delete(delete) => {
                if self.manager.settings().debug {
                    tracing::debug!(
                        table = %delete.table,
                        key = %render_key(&delete.key),
                        condition = delete.condition.as_ref().map_or("", |c| c.text.as_str()),
                        "delete"
                    );
                }
                self.store_call(CallKind::Delete, None);

                store.delete(delete).await.map_err(Error::from_store)
            }
        }
    }

    //
    // Helpers
    //

    fn start(&self, operation: OperationKind, type_name: &str) -> Recorder {
        let recorder = self.manager.recorder();
        recorder.record(&CallEvent::OperationStart {
            operation,
            type_name: type_name.to_string(),
        });

        recorder
    }

    fn store_call(&self, kind: CallKind, index: Option<String>) {
        self.manager.recorder().record(&CallEvent::StoreCall {
            kind,
            table: self.table(),
            index,
        });
    }

    fn log_query(&self, request: &QueryRequest) {
        if self.manager.settings().debug {
            tracing::debug!(
                table = %request.table,
                index = request.index.as_deref().unwrap_or(""),
                key_condition = %request.key_condition,
                "query"
            );
        }
    }

    fn entity_type<E: Entity>(&self) -> Result<&Arc<EntityType>, Error> {
        self.manager.catalog().entity(E::TYPE_NAME)
    }

    fn writer<'a>(&'a self, ty: &'a EntityType) -> Writer<'a> {
        Writer::new(self.manager.catalog(), ty, &self.context)
    }

    fn load<E: Entity>(&self, ty: &EntityType, item: Item) -> Result<E, Error> {
        let document = rehydrate::entity(ty, &self.manager.catalog().layout().type_column, item)?;

        from_document(document, E::TYPE_NAME)
    }

    fn table(&self) -> String {
        self.manager.catalog().layout().name.clone()
    }

    fn type_column(&self) -> ColumnDef {
        string_column(&self.manager.catalog().layout().type_column)
    }
}

fn finish<T>(
    recorder: &Recorder,
    operation: OperationKind,
    type_name: &str,
    result: Result<T, Error>,
) -> Result<T, Error> {
    if let Err(err) = &result {
        tracing::debug!(%operation, type_name, error = %err, "operation failed");
    }
    recorder.record(&CallEvent::OperationFinish {
        operation,
        type_name: type_name.to_string(),
        ok: result.is_ok(),
    });

    result
}

fn string_column(attribute: &str) -> ColumnDef {
    ColumnDef::attribute(attribute, Arc::new(StringConverter))
}

const fn condition_kind(operator: KeyOp) -> ConditionKind {
    match operator {
        KeyOp::Eq => ConditionKind::Eq,
        KeyOp::Lt => ConditionKind::Lt,
        KeyOp::Le => ConditionKind::Le,
        KeyOp::Gt => ConditionKind::Gt,
        KeyOp::Ge => ConditionKind::Ge,
        KeyOp::BeginsWith => ConditionKind::BeginsWith,
    }
}

// Compiled from the key path when there is one, else read from the
// partition identifier.
fn partition_value(ty: &EntityType, document: &mut Document) -> Result<JsonValue, Error> {
    if let Some(key_path) = &ty.key_path {
        return Ok(JsonValue::String(key_path.compile_pk(&*document)?));
    }

    ty.partition
        .column
        .read(document, AccessOptions::read())?
        .ok_or_else(|| {
            Error::validation(
                ErrorOrigin::Manager,
                format!(
                    "'{}': partition '{}' has no value",
                    ty.name,
                    ty.partition.column.property()
                ),
            )
        })
}

fn sort_column<'a>(ty: &'a EntityType, facet: &'a FacetType) -> Option<&'a ColumnDef> {
    match &facet.column {
        Some(column) => Some(column),
        None => ty.sort.as_ref().map(|sort| &sort.column),
    }
}

// `None` leaves the sort dimension unconstrained.
fn sort_value(
    facet: &FacetType,
    column: &ColumnDef,
    document: &mut Document,
) -> Result<Option<JsonValue>, Error> {
    let Some(template) = &facet.template else {
        return column.read(document, AccessOptions::read());
    };

    let numeric = column.converter.name() == "number";
    if facet.operator == KeyOp::BeginsWith && !numeric {
        let prefix = template.compile_prefix(&*document)?;

        return Ok((!prefix.is_empty()).then_some(JsonValue::String(prefix)));
    }

    let raw = template.compile(&*document)?;

    key_operand(column, raw).map(Some)
}

fn to_document<T: Serialize>(value: &T, name: &str) -> Result<Document, Error> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(document)) => Ok(document),
        Ok(other) => Err(Error::validation(
            ErrorOrigin::Manager,
            format!("'{name}' must serialize to an object, got {other}"),
        )),
        Err(err) => Err(Error::validation(
            ErrorOrigin::Manager,
            format!("'{name}' failed to serialize: {err}"),
        )),
    }
}

fn from_document<T: DeserializeOwned>(document: Document, name: &str) -> Result<T, Error> {
    serde_json::from_value(JsonValue::Object(document)).map_err(|err| {
        Error::corruption(
            ErrorOrigin::Manager,
            format!("'{name}' row does not decode: {err}"),
        )
    })
}
