use crate::{
    context::SessionContext,
    convert::ConverterRegistry,
    db::{middleware::WriteMiddleware, session::Session, store::StoreClient},
    error::Error,
    obs::{CallLog, CallSink, Recorder},
    resolve::TypeCatalog,
    schema::Catalog,
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

///
/// ManagerConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Log every outgoing request at debug level.
    pub debug: bool,
    pub consistent_read: bool,
    /// Query page size; `None` leaves paging to the store.
    pub page_size: Option<usize>,
}

impl ManagerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

///
/// EntityManager
///
/// Owns the resolved types of one table and the client used to reach it.
/// Stateless across calls apart from the call log; all work happens in a
/// [`Session`] bound to a caller context.
///

pub struct EntityManager {
    catalog: Arc<TypeCatalog>,
    store: Arc<dyn StoreClient>,
    config: ManagerConfig,
    log: CallLog,
    sink: Option<Arc<dyn CallSink>>,
    middleware: Vec<Arc<dyn WriteMiddleware>>,
}

impl EntityManager {
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>, store: Arc<dyn StoreClient>) -> Self {
        Self {
            catalog,
            store,
            config: ManagerConfig::default(),
            log: CallLog::new(),
            sink: None,
            middleware: Vec::new(),
        }
    }

    /// Resolve `catalog` and build a manager over it.
    pub fn from_catalog(
        catalog: &Catalog,
        converters: &ConverterRegistry,
        store: Arc<dyn StoreClient>,
    ) -> Result<Self, Error> {
        let types = TypeCatalog::resolve(catalog, converters)?;

        Ok(Self::new(Arc::new(types), store))
    }

    #[must_use]
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a hook run on every outgoing put and delete, after the ones
    /// already registered.
    #[must_use]
    pub fn middleware(mut self, middleware: impl WriteMiddleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Forward call events to `sink` as well as the manager's own log.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn CallSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn session(&self, context: SessionContext) -> Session<'_> {
        Session::new(self, context)
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn settings(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub const fn log(&self) -> &CallLog {
        &self.log
    }

    pub(crate) fn store(&self) -> Arc<dyn StoreClient> {
        Arc::clone(&self.store)
    }

    pub(crate) fn middleware_chain(&self) -> &[Arc<dyn WriteMiddleware>] {
        &self.middleware
    }

    pub(crate) fn recorder(&self) -> Recorder {
        Recorder::new(self.log.clone(), self.sink.clone())
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("table", &self.catalog.layout().name)
            .field("config", &self.config)
            .field(
                "middleware",
                &self
                    .middleware
                    .iter()
                    .map(|middleware| middleware.name())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
