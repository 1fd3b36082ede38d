// Query semantics of the in-process tree

use rtdbx_core::{MemoryDb, OrderBy, QueryOptions, RtdbClient, RxErrorKind};
use serde_json::{json, Value};

fn scores() -> MemoryDb {
    MemoryDb::with_data(json!({
        "players": {
            "ann": {"score": 30, "team": "red"},
            "bob": {"score": 10, "team": "blue"},
            "cat": {"score": 20, "team": "red"},
            "dan": {"team": "blue"}
        }
    }))
}

fn keys(value: Option<Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_object().map(|m| m.keys().cloned().collect()))
        .unwrap_or_default()
}

#[tokio::test]
async fn test_order_by_child_puts_missing_values_first() {
    let db = scores();
    let options = QueryOptions {
        order_by: Some(OrderBy::Child("score".to_string())),
        ..QueryOptions::default()
    };

    let result = db.query("players", &options).await.unwrap();

    assert_eq!(keys(result), vec!["dan", "bob", "cat", "ann"]);
}

#[tokio::test]
async fn test_range_and_limit_to_last() {
    let db = scores();
    let options = QueryOptions {
        order_by: Some(OrderBy::Child("score".to_string())),
        start_at: Some(json!(15)),
        limit_to_last: Some(1),
        ..QueryOptions::default()
    };

    let result = db.query("players", &options).await.unwrap();

    assert_eq!(keys(result), vec!["ann"]);
}

#[tokio::test]
async fn test_equal_to_on_child() {
    let db = scores();
    let options = QueryOptions {
        order_by: Some(OrderBy::Child("team".to_string())),
        equal_to: Some(json!("blue")),
        ..QueryOptions::default()
    };

    let result = db.query("players", &options).await.unwrap();

    assert_eq!(keys(result), vec!["bob", "dan"]);
}

#[tokio::test]
async fn test_integer_keys_sort_numerically() {
    let db = MemoryDb::with_data(json!({"orders": {"10": 1, "9": 2, "a": 3}}));
    let options = QueryOptions {
        order_by: Some(OrderBy::Key),
        limit_to_first: Some(2),
        ..QueryOptions::default()
    };

    let result = db.query("orders", &options).await.unwrap();

    assert_eq!(keys(result), vec!["9", "10"]);
}

#[tokio::test]
async fn test_empty_selection_is_absent() {
    let db = scores();
    let options = QueryOptions {
        order_by: Some(OrderBy::Child("score".to_string())),
        start_at: Some(json!(1000)),
        ..QueryOptions::default()
    };

    assert_eq!(db.query("players", &options).await.unwrap(), None);
}

#[tokio::test]
async fn test_failing_reads_surface_external_service() {
    let db = scores();
    db.set_fail_reads(true);

    let err = db.query("players", &QueryOptions::default()).await.unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::ExternalService);
}
