use crate::{
    db::store::{ContinuationToken, QueryRequest, StoreClient},
    error::Error,
    obs::{CallEvent, CallKind, Recorder},
    value::Item,
};
use futures::stream::{self, Stream};
use std::{collections::VecDeque, fmt, sync::Arc};

type Decoder<T> = Box<dyn Fn(Item) -> Result<T, Error> + Send + Sync>;

///
/// CursorState
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum CursorState {
    Fresh,
    More(ContinuationToken),
    Exhausted,
}

///
/// ResultCursor
///
/// Lazy, single-pass sequence over a paginated query. Each page request
/// carries the continuation token of the previous page verbatim; items are
/// decoded as they are handed out.
///

pub struct ResultCursor<T> {
    store: Arc<dyn StoreClient>,
    request: QueryRequest,
    decode: Decoder<T>,
    buffer: VecDeque<Item>,
    state: CursorState,
    pages: usize,
    recorder: Recorder,
}

impl<T> ResultCursor<T> {
    pub(crate) fn new(
        store: Arc<dyn StoreClient>,
        request: QueryRequest,
        decode: impl Fn(Item) -> Result<T, Error> + Send + Sync + 'static,
        recorder: Recorder,
    ) -> Self {
        Self {
            store,
            request,
            decode: Box::new(decode),
            buffer: VecDeque::new(),
            state: CursorState::Fresh,
            pages: 0,
            recorder,
        }
    }

    /// Pages fetched from the store so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// The query this cursor pages through.
    #[must_use]
    pub const fn request(&self) -> &QueryRequest {
        &self.request
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && self.state == CursorState::Exhausted
    }

    /// Next item, fetching pages as needed. Empty pages with a continuation
    /// are skipped.
    pub async fn next(&mut self) -> Result<Option<T>, Error> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return (self.decode)(item).map(Some);
            }

            let start_key = match &self.state {
                CursorState::Exhausted => return Ok(None),
                CursorState::Fresh => None,
                CursorState::More(token) => Some(token.clone()),
            };
            self.fetch(start_key).await?;
        }
    }

    /// Collect up to `limit` items (all remaining items for `None`). Stops
    /// fetching as soon as the limit is reached.
    pub async fn to_vec(mut self, limit: Option<usize>) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();

        while limit.is_none_or(|limit| out.len() < limit) {
            match self.next().await? {
                Some(item) => out.push(item),
                None => break,
            }
        }

        Ok(out)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T, Error>> {
        stream::try_unfold(self, |mut cursor| async move {
            let next = cursor.next().await?;
            Ok::<_, Error>(next.map(|item| (item, cursor)))
        })
    }

    async fn fetch(&mut self, start_key: Option<ContinuationToken>) -> Result<(), Error> {
        let request = QueryRequest {
            start_key,
            ..self.request.clone()
        };

        self.recorder.record(&CallEvent::StoreCall {
            kind: CallKind::Query,
            table: request.table.clone(),
            index: request.index.clone(),
        });
        let page = self.store.query(request).await.map_err(Error::from_store)?;

        self.pages += 1;
        tracing::debug!(
            table = %self.request.table,
            index = ?self.request.index,
            page = self.pages,
            items = page.items.len(),
            more = page.continuation.is_some(),
            "query page fetched"
        );

        self.buffer.extend(page.items);
        self.state = page
            .continuation
            .map_or(CursorState::Exhausted, CursorState::More);

        Ok(())
    }
}

impl<T> fmt::Debug for ResultCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCursor")
            .field("table", &self.request.table)
            .field("index", &self.request.index)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}
