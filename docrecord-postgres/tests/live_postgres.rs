//! Integration tests against a real PostgreSQL server
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p docrecord-postgres -- --ignored

use std::sync::Arc;

use docrecord_core::{ConnectionRegistry, Record, RecordProvider};
use docrecord_postgres::PgConnector;
use serde_json::json;

fn provider(registry: Arc<ConnectionRegistry>) -> RecordProvider {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    RecordProvider::new(registry, &url, None).expect("valid connection string")
}

fn collection_name(test: &str) -> String {
    format!("{}_{}", test, std::process::id())
}

#[tokio::test]
#[ignore = "requires database"]
async fn crud_round_trip() {
    let provider = provider(ConnectionRegistry::shared(PgConnector::new()));
    let users = collection_name("crud");

    for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
        provider
            .create(&users, Record::new().with_id(id).with("name", name))
            .await
            .expect("create failed");
    }

    let names: Vec<_> = provider
        .get_all(&users)
        .await
        .unwrap()
        .into_iter()
        .filter_map(|r| r.get("name").cloned())
        .collect();
    assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);

    let err = provider
        .create(&users, Record::new().with_id(2).with("name", "dup"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(provider.get(&users, 2).await.unwrap().get("name"), Some(&json!("b")));

    // string "2" is a different identifier
    assert!(provider.get(&users, "2").await.unwrap_err().is_not_found());

    let updated = provider
        .update(&users, 2, Record::new().with("foo", "bar"), false)
        .await
        .unwrap();
    assert_eq!(updated.get("name"), Some(&json!("b")));
    assert_eq!(updated.get("foo"), Some(&json!("bar")));

    for id in 1..=3 {
        assert!(provider.delete(&users, id).await.unwrap());
    }
    assert!(!provider.delete(&users, 1).await.unwrap());

    provider.close_connection().await.unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn upsert_creates_then_merges() {
    let provider = provider(ConnectionRegistry::shared(PgConnector::new()));
    let items = collection_name("upsert");

    let err = provider
        .update(&items, "k", Record::new().with("v", 1), false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let created = provider
        .update(&items, "k", Record::new().with("v", 1), true)
        .await
        .unwrap();
    assert_eq!(created, Record::new().with_id("k").with("v", 1));

    let merged = provider
        .update(&items, "k", Record::new().with("w", 2), true)
        .await
        .unwrap();
    assert_eq!(merged, Record::new().with_id("k").with("v", 1).with("w", 2));

    provider.delete(&items, "k").await.unwrap();
    provider.close_connection().await.unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn providers_share_one_pool() {
    let registry = ConnectionRegistry::shared(PgConnector::new());
    let first = provider(Arc::clone(&registry));
    let second = provider(Arc::clone(&registry));

    first.get_all("shared").await.unwrap();
    second.get_all("shared").await.unwrap();
    assert_eq!(registry.len().await, 1);

    first.close_connection().await.unwrap();
    assert!(second.get_all("shared").await.is_err());
}
