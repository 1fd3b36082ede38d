// Integration tests for write and read command dispatch

use rtdbx_core::{MemoryDb, OperationKind, OrderBy, QueryOptions, RtdbClient, RxErrorKind};
use rtdbx_engine::{
    apply_read_command, apply_write_command, GuardConfig, ReadCommand, WriteCommand, WriteGuard,
};
use rtdbx_store::snapshot::{ProgressFn, RestoreProgress};
use rtdbx_store::{
    AuditFilter, AuditLedger, ReadResult, ResultCache, SnapshotCodec, SnapshotFilter,
    SnapshotStore,
};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    db: Arc<MemoryDb>,
    client: Arc<dyn RtdbClient>,
    snapshots: SnapshotStore,
    ledger: AuditLedger,
    guard: WriteGuard,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::with_data(json!({
        "users": {"abc": {"name": "Ada"}, "def": {"name": "Grace"}}
    })));
    let client: Arc<dyn RtdbClient> = db.clone();
    let snapshots = SnapshotStore::open(
        dir.path().join("backups"),
        Some(SnapshotCodec::new(client.clone())),
    )
    .await
    .unwrap();
    let ledger = AuditLedger::open(dir.path().join("audit")).await.unwrap();
    let guard = WriteGuard::new(GuardConfig::default())
        .with_snapshots(snapshots.clone())
        .with_ledger(ledger.clone());
    Fixture {
        dir,
        db,
        client,
        snapshots,
        ledger,
        guard,
    }
}

#[tokio::test]
async fn test_put_patch_delete_push_are_all_audited() {
    let f = fixture().await;
    let mut values = Map::new();
    values.insert("name".to_string(), json!("Ada L."));

    let commands = vec![
        WriteCommand::Put {
            path: "users/xyz".to_string(),
            value: json!({"name": "Linus"}),
        },
        WriteCommand::Patch {
            path: "users/abc".to_string(),
            values,
        },
        WriteCommand::Delete {
            path: "users/def".to_string(),
        },
        WriteCommand::Push {
            path: "events".to_string(),
            value: json!({"kind": "cleanup"}),
        },
    ];
    for cmd in commands {
        apply_write_command(cmd, &f.client, &f.guard, None)
            .await
            .unwrap();
    }

    let entries = f.ledger.list(&AuditFilter::default()).await.unwrap();
    let ops: Vec<OperationKind> = entries.iter().rev().map(|e| e.op).collect();
    assert_eq!(
        ops,
        vec![
            OperationKind::Put,
            OperationKind::Patch,
            OperationKind::Delete,
            OperationKind::Push
        ]
    );
    assert_eq!(f.db.get("users/abc/name").await.unwrap(), Some(json!("Ada L.")));
    assert_eq!(f.db.get("users/def").await.unwrap(), None);

    // users/xyz did not exist and push is additive: two snapshots remain
    let snapshots = f.snapshots.list(&SnapshotFilter::default()).await.unwrap();
    let ops: Vec<_> = snapshots.iter().map(|m| m.operation).collect();
    assert_eq!(
        ops,
        vec![Some(OperationKind::Delete), Some(OperationKind::Patch)]
    );
}

#[tokio::test]
async fn test_push_result_carries_generated_key() {
    let f = fixture().await;

    let outcome = apply_write_command(
        WriteCommand::Push {
            path: "events".to_string(),
            value: json!({"kind": "login"}),
        },
        &f.client,
        &f.guard,
        None,
    )
    .await
    .unwrap();

    let key = outcome.result["key"].as_str().unwrap().to_string();
    assert_eq!(key.len(), 20);
    assert_eq!(outcome.result["path"], json!(format!("events/{}", key)));
}

#[tokio::test]
async fn test_load_imports_document_with_progress_and_backup() {
    // Given: a document for users with three keys
    let f = fixture().await;
    let file = f.dir.path().join("import.yaml");
    std::fs::write(
        &file,
        "_path: users\nabc: {name: Ada}\nnew1: {name: Barbara}\nnew2: {name: Edsger}\n",
    )
    .unwrap();
    let seen: Arc<Mutex<Vec<RestoreProgress>>> = Arc::default();
    let sink = seen.clone();
    let record = move |p: &RestoreProgress| sink.lock().unwrap().push(p.clone());
    let observer: &ProgressFn = &record;

    // When: it is loaded through the guard
    let outcome = apply_write_command(
        WriteCommand::Load { file },
        &f.client,
        &f.guard,
        Some(observer),
    )
    .await
    .unwrap();

    // Then: the tree holds the new children and the old one
    assert_eq!(outcome.result, json!({"path": "users"}));
    assert_eq!(f.db.get("users/new2/name").await.unwrap(), Some(json!("Edsger")));
    assert_eq!(f.db.get("users/def/name").await.unwrap(), Some(json!("Grace")));
    assert_eq!(seen.lock().unwrap().len(), 3);

    // And: the previous users subtree was snapshotted as a load backup
    let backup = outcome.backup_file.unwrap();
    assert!(backup.starts_with("load_users_"));
    let entries = f.ledger.list(&AuditFilter::default()).await.unwrap();
    assert_eq!(entries[0].op, OperationKind::Load);
    assert_eq!(entries[0].path, "users");
}

#[tokio::test]
async fn test_load_of_malformed_document_writes_no_ledger_entry() {
    let f = fixture().await;
    let file = f.dir.path().join("orphan.yaml");
    std::fs::write(&file, "name: nobody\n").unwrap();

    let err = apply_write_command(WriteCommand::Load { file }, &f.client, &f.guard, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::MalformedSnapshot);
    assert!(f.ledger.list(&AuditFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_write_command_is_recorded() {
    let f = fixture().await;
    f.db.fail_next_write("permission denied");

    let err = apply_write_command(
        WriteCommand::Delete {
            path: "users/abc".to_string(),
        },
        &f.client,
        &f.guard,
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.message(), "permission denied");
    let entries = f.ledger.list(&AuditFilter::default()).await.unwrap();
    assert_eq!(entries[0].error_message.as_deref(), Some("permission denied"));
    assert!(entries[0].backup_file.is_some());
    assert_eq!(f.db.get("users/abc/name").await.unwrap(), Some(json!("Ada")));
}

#[tokio::test]
async fn test_get_shallow_and_keys() {
    let f = fixture().await;

    let shallow = apply_read_command(
        ReadCommand::Get {
            path: "users".to_string(),
            shallow: true,
        },
        f.client.as_ref(),
        None,
    )
    .await
    .unwrap();
    let keys = apply_read_command(
        ReadCommand::Keys {
            path: "users".to_string(),
        },
        f.client.as_ref(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        shallow,
        ReadResult::Inline(json!({
            "abc": {"_type": "object", "_children": 1},
            "def": {"_type": "object", "_children": 1}
        }))
    );
    assert_eq!(keys, ReadResult::Inline(json!({"abc": true, "def": true})));
}

#[tokio::test]
async fn test_absent_value_reads_as_null() {
    let f = fixture().await;

    let result = apply_read_command(
        ReadCommand::Get {
            path: "nothing".to_string(),
            shallow: false,
        },
        f.client.as_ref(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(result, ReadResult::Inline(Value::Null));
}

#[tokio::test]
async fn test_large_query_result_is_cached() {
    let f = fixture().await;
    let cache = ResultCache::open(f.dir.path().join("cache"))
        .await
        .unwrap()
        .with_threshold(16);

    let result = apply_read_command(
        ReadCommand::Query {
            path: "users".to_string(),
            options: QueryOptions {
                order_by: Some(OrderBy::Child("name".to_string())),
                ..QueryOptions::default()
            },
        },
        f.client.as_ref(),
        Some(&cache),
    )
    .await
    .unwrap();

    let summary = match result {
        ReadResult::Cached(summary) => summary,
        other => panic!("expected a cached summary, got {:?}", other),
    };
    assert_eq!(summary.path, "users");
    assert_eq!(summary.child_count, Some(2));
    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(&summary.file).unwrap()).unwrap();
    assert_eq!(stored["def"]["name"], json!("Grace"));
}
