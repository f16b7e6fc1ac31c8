mod common;

use common::{File, memory, open, session};
use proptest::prelude::*;
use std::sync::Arc;
use tablemap::{core::error::ErrorClass, prelude::*};

#[tokio::test]
async fn file_round_trips_through_the_table() {
    let store = memory();
    let manager = open(Arc::clone(&store) as _);
    let session = manager.session(session());

    let file = File {
        mime_type: Some("text/plain".into()),
        size: Some(10),
        ..File::named("acme", "root", "a.txt")
    };
    let created = session.create(&file).await.expect("create succeeds");

    assert_eq!(created.pk.as_deref(), Some("acme/root"));
    assert_eq!(created.sk.as_deref(), Some("file/a.txt"));
    assert_eq!(created.size, Some(10));
    assert_eq!(created.created_by.as_deref(), Some("ana"));
    assert!(created.created_at.is_some());
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.version, Some(1));
    assert_eq!(file.pk, None, "the caller's instance is left alone");

    let loaded = session
        .get(&File::named("acme", "root", "a.txt"))
        .await
        .expect("row found");
    assert_eq!(loaded, created);

    let renamed = File {
        mime_type: Some("text/markdown".into()),
        ..loaded
    };
    let updated = session.update(&renamed, None).await.expect("update succeeds");
    assert_eq!(updated.version, Some(2));
    assert_eq!(updated.mime_type.as_deref(), Some("text/markdown"));
    assert_eq!(updated.created_at, created.created_at);

    let listed = session
        .query_facet(&File::directory("acme", "root"), None)
        .expect("query builds")
        .to_vec(None)
        .await
        .expect("query runs");
    assert_eq!(listed, [updated.clone()]);

    let removed = session.delete(&updated).await.expect("delete succeeds");
    assert_eq!(removed.file_name.as_deref(), Some("a.txt"));
    assert!(store.items().is_empty());

    let err = session
        .get(&File::named("acme", "root", "a.txt"))
        .await
        .expect_err("row is gone");
    assert_eq!(err.class, ErrorClass::NotFound);
}

#[tokio::test]
async fn concurrent_writers_lose_on_the_version_predicate() {
    let store = memory();
    let manager = open(Arc::clone(&store) as _);
    let session = manager.session(session());

    let created = session
        .create(&File::named("acme", "root", "a.txt"))
        .await
        .expect("create succeeds");

    let first = File {
        size: Some(1),
        ..created.clone()
    };
    let second = File {
        size: Some(2),
        ..created.clone()
    };

    session.update(&first, None).await.expect("first writer wins");
    let err = session
        .update(&second, None)
        .await
        .expect_err("second writer holds a stale version");

    assert!(err.is_condition_failed(), "unexpected error: {err:?}");
    assert_eq!(second.version, Some(1), "a rejected write leaves the caller's copy");

    let stored = session.get(&created).await.expect("row found");
    assert_eq!(stored.size, Some(1));
    assert_eq!(stored.version, Some(2));
}

#[tokio::test]
async fn engine_managed_fields_cannot_be_created() {
    let store = memory();
    let manager = open(Arc::clone(&store) as _);

    let forged = File {
        created_by: Some("mallory".into()),
        ..File::named("acme", "root", "a.txt")
    };
    let err = manager
        .session(session())
        .create(&forged)
        .await
        .expect_err("createdBy is internal");

    assert!(err.is_validation(), "unexpected error: {err:?}");
    assert_eq!(store.total_calls(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn key_fields_survive_a_store_round_trip(
        account in "[a-z][a-z0-9]{0,11}",
        directory in "[a-z][a-z0-9_-]{0,11}",
        file_name in "[a-z0-9][a-z0-9._-]{0,15}",
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime builds");

        let loaded = runtime.block_on(async {
            let manager = open(memory() as _);
            let session = manager.session(session());
            let file = File::named(&account, &directory, &file_name);

            session.create(&file).await.expect("create succeeds");
            session.get(&file).await.expect("row found")
        });

        prop_assert_eq!(loaded.account, Some(account));
        prop_assert_eq!(loaded.directory, Some(directory));
        prop_assert_eq!(loaded.file_name, Some(file_name));
    }
}
