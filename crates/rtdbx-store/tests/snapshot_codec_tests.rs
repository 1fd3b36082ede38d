// Integration tests for the snapshot codec
// Covers dump/load round trips, reserved keys and the chunked restore

use rtdbx_core::memory::WriteMethod;
use rtdbx_core::{MemoryDb, RtdbClient, RxErrorKind};
use rtdbx_store::snapshot::{ProgressFn, RestoreProgress, SnapshotCodec, PATH_KEY, VALUE_KEY};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn setup(data: Value) -> (Arc<MemoryDb>, SnapshotCodec, TempDir) {
    let db = Arc::new(MemoryDb::with_data(data));
    let codec = SnapshotCodec::new(db.clone());
    (db, codec, TempDir::new().expect("Failed to create temp snapshot directory"))
}

#[tokio::test]
async fn test_dump_then_load_restores_deleted_subtree() {
    // Given: a populated subtree
    let original = json!({"name": "Ada", "roles": {"admin": true}, "age": 36});
    let (db, codec, dir) = setup(json!({"users": {"abc": original.clone()}}));

    // When: we dump it, delete it, and load the dump
    let file = codec.dump("users/abc", dir.path(), None).await.unwrap();
    db.delete("users/abc").await.unwrap();
    let name = file.file_name().unwrap().to_str().unwrap().to_string();
    let restored = codec.load(&name, dir.path(), None).await.unwrap();

    // Then: the subtree is back, without reserved keys
    assert_eq!(restored, "users/abc");
    let value = db.get("users/abc").await.unwrap().unwrap();
    assert_eq!(value, original);
    assert!(value.get(PATH_KEY).is_none());
    assert!(value.get(VALUE_KEY).is_none());
}

#[tokio::test]
async fn test_scalar_round_trip() {
    // Given: a scalar leaf
    let (db, codec, dir) = setup(json!({"config": {"motd": "hello"}}));

    // When: it is dumped, overwritten and restored
    codec
        .dump("config/motd", dir.path(), Some("motd.yaml"))
        .await
        .unwrap();
    db.set("config/motd", json!("changed")).await.unwrap();
    codec.load("motd.yaml", dir.path(), None).await.unwrap();

    // Then: the original scalar is back at the same path
    assert_eq!(db.get("config/motd").await.unwrap(), Some(json!("hello")));
    let yaml = std::fs::read_to_string(dir.path().join("motd.yaml")).unwrap();
    assert!(yaml.contains("_value: hello"));
}

#[tokio::test]
async fn test_dump_of_absent_path_is_not_found() {
    let (_db, codec, dir) = setup(json!({"a": 1}));

    let err = codec.dump("missing", dir.path(), None).await.unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::NotFound);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_generated_names_never_overwrite() {
    let (_db, codec, dir) = setup(json!({"a": {"b": 1}}));

    let first = codec.dump("a", dir.path(), None).await.unwrap();
    let second = codec.dump("a", dir.path(), None).await.unwrap();

    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
}

#[tokio::test]
async fn test_load_missing_file_is_not_found() {
    let (_db, codec, dir) = setup(json!({}));

    let err = codec.load("nope.yaml", dir.path(), None).await.unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::NotFound);
}

#[tokio::test]
async fn test_load_without_path_is_malformed_and_writes_nothing() {
    let (db, codec, dir) = setup(json!({}));
    std::fs::write(dir.path().join("orphan.yaml"), "name: Ada\n").unwrap();

    let err = codec.load("orphan.yaml", dir.path(), None).await.unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::MalformedSnapshot);
    assert!(db.writes().is_empty());
}

#[tokio::test]
async fn test_five_keys_restore_in_five_sequential_merges() {
    // Given: a document with five sibling keys
    let (db, codec, dir) = setup(json!({}));
    std::fs::write(
        dir.path().join("bulk.yaml"),
        "_path: imports\nk1: {v: 1}\nk2: {v: 2}\nk3: {v: 3}\nk4: {v: 4}\nk5: {v: 5}\n",
    )
    .unwrap();

    // When: it is loaded with a progress observer
    let seen: Arc<Mutex<Vec<RestoreProgress>>> = Arc::default();
    let sink = seen.clone();
    let record = move |p: &RestoreProgress| sink.lock().unwrap().push(p.clone());
    let observer: &ProgressFn = &record;
    codec
        .load("bulk.yaml", dir.path(), Some(observer))
        .await
        .unwrap();

    // Then: five merges were issued in document order, one per key
    let writes = db.writes();
    assert_eq!(writes.len(), 5);
    assert!(writes.iter().all(|w| w.method == WriteMethod::Merge));
    let paths: Vec<&str> = writes.iter().map(|w| w.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["imports/k1", "imports/k2", "imports/k3", "imports/k4", "imports/k5"]
    );

    // And: progress went 1/5 .. 5/5
    let progress = seen.lock().unwrap();
    let steps: Vec<(usize, usize)> = progress.iter().map(|p| (p.index, p.total)).collect();
    assert_eq!(steps, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    assert_eq!(db.get("imports/k3/v").await.unwrap(), Some(json!(3)));
}

#[tokio::test]
async fn test_dumped_keys_replay_in_document_order() {
    // Given: a dumped subtree whose children follow insertion order
    let (db, codec, dir) = setup(json!({"shop": {"a": 1, "b": 2, "c": 3}}));
    codec.dump("shop", dir.path(), Some("shop.yaml")).await.unwrap();
    db.delete("shop").await.unwrap();
    let before = db.writes().len();

    // When: the dump is loaded back
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = seen.clone();
    let record = move |p: &RestoreProgress| sink.lock().unwrap().push(p.key.clone());
    let observer: &ProgressFn = &record;
    codec.load("shop.yaml", dir.path(), Some(observer)).await.unwrap();

    // Then: one write per key, in the order the document lists them
    let writes = db.writes();
    let paths: Vec<&str> = writes[before..].iter().map(|w| w.path.as_str()).collect();
    assert_eq!(paths, vec!["shop/a", "shop/b", "shop/c"]);
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_single_key_document_is_one_merge_at_path() {
    let (db, codec, dir) = setup(json!({}));
    std::fs::write(dir.path().join("one.yaml"), "_path: users\nabc: {name: Ada}\n").unwrap();

    codec.load("one.yaml", dir.path(), None).await.unwrap();

    let writes = db.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].method, WriteMethod::Merge);
    assert_eq!(writes[0].path, "users");
}

#[tokio::test]
async fn test_restoring_twice_is_idempotent() {
    let (db, codec, dir) = setup(json!({"shop": {"a": {"x": 1}, "b": 2, "c": "three"}}));
    let file = codec.dump("shop", dir.path(), Some("shop.yaml")).await.unwrap();
    assert!(file.exists());

    db.set("shop/b", json!(99)).await.unwrap();
    codec.load("shop.yaml", dir.path(), None).await.unwrap();
    let once = db.dump();
    codec.load("shop.yaml", dir.path(), None).await.unwrap();

    assert_eq!(db.dump(), once);
    assert_eq!(db.get("shop").await.unwrap(), Some(json!({"a": {"x": 1}, "b": 2, "c": "three"})));
}

#[tokio::test]
async fn test_failed_chunk_stops_restore() {
    let (db, codec, dir) = setup(json!({}));
    std::fs::write(dir.path().join("two.yaml"), "_path: p\na: 1\nb: 2\n").unwrap();
    db.fail_next_write("write stalled");

    let err = codec.load("two.yaml", dir.path(), None).await.unwrap_err();

    assert_eq!(err.message(), "write stalled");
    assert_eq!(db.get("p").await.unwrap(), None);
}
