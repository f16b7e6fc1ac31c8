//! Backing store boundary.
//!
//! The orchestrator talks to the table only through [`StoreClient`]. Requests
//! carry finished [`Expression`]s; responses carry raw wire items.
use crate::{expr::Expression, value::Item};
use async_trait::async_trait;
use derive_more::{Deref, Display};
use thiserror::Error as ThisError;

///
/// ContinuationToken
///
/// Opaque position returned with a query page. Callers hand it back verbatim.
///

#[derive(Clone, Debug, Deref, Display, Eq, PartialEq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

///
/// GetRequest
///

#[derive(Clone, Debug)]
pub struct GetRequest {
    pub table: String,
    pub key: Item,
    pub consistent_read: bool,
}

///
/// PutRequest
///

#[derive(Clone, Debug)]
pub struct PutRequest {
    pub table: String,
    pub item: Item,
    pub condition: Option<Expression>,
}

///
/// DeleteRequest
///

#[derive(Clone, Debug)]
pub struct DeleteRequest {
    pub table: String,
    pub key: Item,
    pub condition: Option<Expression>,
}

///
/// QueryRequest
///

#[derive(Clone, Debug)]
pub struct QueryRequest {
    pub table: String,
    /// Local or view index; `None` queries the table keys.
    pub index: Option<String>,
    pub key_condition: Expression,
    pub filter: Option<Expression>,
    /// Page size hint.
    pub limit: Option<usize>,
    pub scan_forward: bool,
    pub start_key: Option<ContinuationToken>,
    pub consistent_read: bool,
}

///
/// QueryPage
///

#[derive(Clone, Debug, Default)]
pub struct QueryPage {
    pub items: Vec<Item>,
    /// Present while more pages remain.
    pub continuation: Option<ContinuationToken>,
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("conditional check failed: {message}")]
    ConditionFailed { message: String },

    #[error("store transport failure: {message}")]
    Transport { message: String },
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

///
/// StoreClient
///

#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError>;

    async fn put(&self, request: PutRequest) -> Result<(), StoreError>;

    /// Delete a row, returning the old item when one existed.
    async fn delete(&self, request: DeleteRequest) -> Result<Option<Item>, StoreError>;

    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError>;
}
