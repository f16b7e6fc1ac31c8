mod common;

use async_trait::async_trait;
use common::{File, layout, memory, open, session};
use std::sync::{Arc, Mutex};
use tablemap::{
    ManagerConfig, MemoryStore,
    db::{DeleteRequest, GetRequest, PutRequest, QueryPage, QueryRequest, StoreClient, StoreError},
    prelude::*,
};

///
/// PageRecorder
///
/// Delegates to a memory store and remembers the size of every page served.
///

struct PageRecorder {
    inner: Arc<MemoryStore>,
    pages: Mutex<Vec<usize>>,
}

impl PageRecorder {
    fn pages(&self) -> Vec<usize> {
        self.pages.lock().expect("pages lock").clone()
    }
}

#[async_trait]
impl StoreClient for PageRecorder {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError> {
        self.inner.get(request).await
    }

    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        self.inner.put(request).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<Option<Item>, StoreError> {
        self.inner.delete(request).await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError> {
        let page = self.inner.query(request).await?;
        self.pages.lock().expect("pages lock").push(page.items.len());

        Ok(page)
    }
}

async fn seeded(names: &[&str]) -> Arc<PageRecorder> {
    let store = Arc::new(PageRecorder {
        inner: memory(),
        pages: Mutex::new(Vec::new()),
    });
    let manager = open(Arc::clone(&store) as _);
    let session = manager.session(session());

    for name in names {
        session
            .create(&File::named("acme", "root", name))
            .await
            .expect("seed file");
    }

    store
}

#[tokio::test]
async fn five_rows_page_as_two_two_one() {
    let store = seeded(&["a", "b", "c", "d", "e"]).await;
    let manager = open(Arc::clone(&store) as _).config(ManagerConfig::new().page_size(2));
    let session = manager.session(session());

    let mut cursor = session
        .query_facet(&File::directory("acme", "root"), None)
        .expect("query builds");
    let mut names = Vec::new();
    while let Some(file) = cursor.next().await.expect("page loads") {
        names.extend(file.file_name);
    }

    assert_eq!(names, ["a", "b", "c", "d", "e"]);
    assert_eq!(store.pages(), [2, 2, 1]);
    assert_eq!(cursor.pages_fetched(), 3);
}

#[tokio::test]
async fn collecting_four_fetches_two_pages() {
    let store = seeded(&["a", "b", "c", "d", "e"]).await;
    let manager = open(Arc::clone(&store) as _).config(ManagerConfig::new().page_size(2));
    let session = manager.session(session());

    let files = session
        .query_facet(&File::directory("acme", "root"), None)
        .expect("query builds")
        .to_vec(Some(4))
        .await
        .expect("query runs");

    assert_eq!(files.len(), 4);
    assert_eq!(store.pages(), [2, 2]);
    assert_eq!(manager.log().store_calls(), 2);
}

#[tokio::test]
async fn empty_partition_fetches_once() {
    let store = Arc::new(MemoryStore::new(&layout()));
    let manager = open(Arc::clone(&store) as _);

    let files = manager
        .session(session())
        .query_facet(&File::directory("acme", "empty"), None)
        .expect("query builds")
        .to_vec(None)
        .await
        .expect("query runs");

    assert!(files.is_empty());
    assert_eq!(store.calls(tablemap::core::obs::CallKind::Query), 1);
}
