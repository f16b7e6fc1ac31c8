//! In-process [`StoreClient`] over one table layout.
//!
//! Evaluates the structured clauses of every expression, honours conditional
//! writes, pages queries with hex continuation tokens, and journals requests
//! so callers can inspect exactly what was sent.
use crate::{
    db::{
        codec::{decode_token, encode_token},
        store::{
            DeleteRequest, GetRequest, PutRequest, QueryPage, QueryRequest, StoreClient,
            StoreError,
        },
    },
    expr::{Clause, ConditionKind, Expression},
    obs::CallKind,
    schema::TableLayout,
    value::{AttributeValue, Item, render_key},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

///
/// MemoryStore
///

#[derive(Debug)]
pub struct MemoryStore {
    layout: TableLayout,
    rows: Mutex<BTreeMap<String, Item>>,
    calls: Mutex<HashMap<CallKind, usize>>,
    failures: Mutex<Vec<(CallKind, StoreError)>>,
    puts: Mutex<Vec<PutRequest>>,
    deletes: Mutex<Vec<DeleteRequest>>,
    queries: Mutex<Vec<QueryRequest>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(layout: &TableLayout) -> Self {
        Self {
            layout: layout.clone(),
            rows: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(Vec::new()),
            puts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Write a row directly, bypassing conditions and the journal.
    pub fn insert(&self, item: Item) {
        let key = self.primary_key(&item);
        self.rows.lock().insert(render_key(&key), item);
    }

    /// Every stored row, in rendered-key order.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.rows.lock().values().cloned().collect()
    }

    #[must_use]
    pub fn calls(&self, kind: CallKind) -> usize {
        self.calls.lock().get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Fail the next call of `kind` with `error`.
    pub fn fail_next(&self, kind: CallKind, error: StoreError) {
        self.failures.lock().push((kind, error));
    }

    #[must_use]
    pub fn puts(&self) -> Vec<PutRequest> {
        self.puts.lock().clone()
    }

    #[must_use]
    pub fn deletes(&self) -> Vec<DeleteRequest> {
        self.deletes.lock().clone()
    }

    #[must_use]
    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().clone()
    }

    // Count the call and surface any injected failure for it.
    fn enter(&self, kind: CallKind) -> Result<(), StoreError> {
        *self.calls.lock().entry(kind).or_default() += 1;

        let mut failures = self.failures.lock();
        match failures.iter().position(|(pending, _)| *pending == kind) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn primary_key(&self, item: &Item) -> Item {
        let mut key = Item::new();
        let names = std::iter::once(self.layout.partition_key.as_str())
            .chain(self.layout.sort_key.as_deref());

        for name in names {
            if let Some(value) = item.get(name) {
                key.insert(name.to_string(), value.clone());
            }
        }

        key
    }

    fn check(
        existing: Option<&Item>,
        condition: Option<&Expression>,
    ) -> Result<(), StoreError> {
        let Some(condition) = condition else {
            return Ok(());
        };

        let empty = Item::new();
        let row = existing.unwrap_or(&empty);
        match condition.clauses.iter().find(|clause| !matches(clause, row)) {
            Some(clause) => Err(StoreError::ConditionFailed {
                message: format!("condition '{}' not met", clause.text),
            }),
            None => Ok(()),
        }
    }

    // Token key: primary key plus the index key attributes of the row.
    fn position_key(&self, item: &Item, index: (&str, Option<&str>)) -> Item {
        let mut key = self.primary_key(item);
        for name in std::iter::once(index.0).chain(index.1) {
            if let Some(value) = item.get(name) {
                key.insert(name.to_string(), value.clone());
            }
        }

        key
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError> {
        self.enter(CallKind::Get)?;

        Ok(self.rows.lock().get(&render_key(&request.key)).cloned())
    }

    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        self.enter(CallKind::Put)?;
        self.puts.lock().push(request.clone());

        let key = render_key(&self.primary_key(&request.item));
        let mut rows = self.rows.lock();
        Self::check(rows.get(&key), request.condition.as_ref())?;
        rows.insert(key, request.item);

        Ok(())
    }

    async fn delete(&self, request: DeleteRequest) -> Result<Option<Item>, StoreError> {
        self.enter(CallKind::Delete)?;
        self.deletes.lock().push(request.clone());

        let key = render_key(&request.key);
        let mut rows = self.rows.lock();
        Self::check(rows.get(&key), request.condition.as_ref())?;

        Ok(rows.remove(&key))
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError> {
        self.enter(CallKind::Query)?;
        self.queries.lock().push(request.clone());

        let index = self
            .layout
            .key_attributes(request.index.as_deref())
            .ok_or_else(|| {
                StoreError::transport(format!(
                    "unknown index '{}'",
                    request.index.as_deref().unwrap_or_default()
                ))
            })?;
        let (pk, sk) = index;

        let mut matched = self
            .rows
            .lock()
            .values()
            .filter(|item| item.contains_key(pk) && sk.is_none_or(|sk| item.contains_key(sk)))
            .filter(|item| {
                request
                    .key_condition
                    .clauses
                    .iter()
                    .all(|clause| matches(clause, item))
            })
            .filter(|item| {
                request
                    .filter
                    .as_ref()
                    .is_none_or(|filter| filter.clauses.iter().all(|clause| matches(clause, item)))
            })
            .cloned()
            .collect::<Vec<_>>();

        matched.sort_by(|a, b| {
            let by = |name: &str| match (a.get(name), b.get(name)) {
                (Some(x), Some(y)) => x.key_cmp(y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            let tie = || render_key(&self.primary_key(a)).cmp(&render_key(&self.primary_key(b)));

            by(pk)
                .then_with(|| sk.map_or(Ordering::Equal, by))
                .then_with(tie)
        });
        if !request.scan_forward {
            matched.reverse();
        }

        if let Some(token) = &request.start_key {
            let start = decode_token(token)
                .map_err(|err| StoreError::transport(format!("bad continuation token: {err}")))?;
            let resume = matched
                .iter()
                .position(|item| self.position_key(item, index) == start)
                .map_or(matched.len(), |position| position + 1);
            matched.drain(..resume);
        }

        let limit = request
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(usize::MAX);
        let continuation = (matched.len() > limit)
            .then(|| encode_token(&self.position_key(&matched[limit - 1], index)));
        matched.truncate(limit);

        Ok(QueryPage {
            items: matched,
            continuation,
        })
    }
}

fn lookup<'a>(item: &'a Item, path: &[String]) -> Option<&'a AttributeValue> {
    let (first, rest) = path.split_first()?;
    let mut current = item.get(first)?;

    for segment in rest {
        current = current.as_map()?.get(segment)?;
    }

    Some(current).filter(|value| !value.is_null())
}

fn compare(value: Option<&AttributeValue>, operand: Option<&AttributeValue>) -> Option<Ordering> {
    value?.key_cmp(operand?)
}

fn contains(value: Option<&AttributeValue>, element: Option<&AttributeValue>) -> bool {
    match (value, element) {
        (Some(AttributeValue::S(haystack)), Some(AttributeValue::S(needle))) => {
            haystack.contains(needle.as_str())
        }
        (Some(AttributeValue::Ss(set)), Some(AttributeValue::S(needle))) => set.contains(needle),
        (Some(AttributeValue::L(list)), Some(element)) => list.contains(element),
        _ => false,
    }
}

/// Evaluate one clause against a row.
pub(crate) fn matches(clause: &Clause, item: &Item) -> bool {
    let value = lookup(item, &clause.attribute);
    let first = clause.values.first();

    match clause.kind {
        ConditionKind::Null => value.is_none(),
        ConditionKind::NotNull => value.is_some(),
        ConditionKind::Eq => value.is_some() && value == first,
        ConditionKind::Ne => value != first,
        ConditionKind::Lt => compare(value, first) == Some(Ordering::Less),
        ConditionKind::Le => matches!(
            compare(value, first),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ConditionKind::Gt => compare(value, first) == Some(Ordering::Greater),
        ConditionKind::Ge => matches!(
            compare(value, first),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ConditionKind::BeginsWith => match (value, first) {
            (Some(AttributeValue::S(s)), Some(AttributeValue::S(prefix))) => s.starts_with(prefix),
            _ => false,
        },
        ConditionKind::Contains => contains(value, first),
        ConditionKind::NotContains => !contains(value, first),
        ConditionKind::In => value.is_some_and(|value| clause.values.contains(value)),
        ConditionKind::Between => {
            matches!(
                compare(value, first),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                compare(value, clause.values.get(1)),
                Some(Ordering::Less | Ordering::Equal)
            )
        }
    }
}
