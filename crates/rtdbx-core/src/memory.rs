//! In-process hierarchical key-value tree
//!
//! `MemoryDb` implements [`RtdbClient`] over a single JSON tree with the same
//! storage rules as the remote database:
//!
//! - writing `null` removes a node, and empty objects never persist
//! - arrays are stored as objects keyed by index
//! - `merge` replaces each named child independently
//!
//! It also records every write and supports fault injection, which makes it
//! the standard fake for exercising the write guard and the snapshot codec.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use crate::client::{OrderBy, QueryOptions, RtdbClient};
use crate::errors::{Result, RxError, RxErrorKind};
use crate::model::{join_path, path_segments};
use crate::push_id::PushIdGenerator;

/// Kind of write recorded by [`MemoryDb`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Set,
    Merge,
    Delete,
    Push,
}

/// One write issued against a [`MemoryDb`], in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub method: WriteMethod,
    pub path: String,
}

/// In-memory database tree
#[derive(Debug, Default)]
pub struct MemoryDb {
    root: Mutex<Value>,
    writes: Mutex<Vec<WriteRecord>>,
    fail_next_write: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    push_ids: PushIdGenerator,
}

impl MemoryDb {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree seeded with `data` at the root
    pub fn with_data(data: Value) -> Self {
        let db = Self::new();
        *db.root.lock().unwrap_or_else(|p| p.into_inner()) =
            normalize(data).unwrap_or(Value::Null);
        db
    }

    /// Clone of the whole tree (`Value::Null` when empty)
    pub fn dump(&self) -> Value {
        self.root.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Every write issued so far, oldest first
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    /// Make the next write fail with an `ActionFailed` error carrying `message`
    pub fn fail_next_write(&self, message: impl Into<String>) {
        *self
            .fail_next_write
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(message.into());
    }

    /// Make every read fail with an `ExternalService` error while enabled
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    fn check_read(&self, op: &str, path: &str) -> Result<()> {
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            return Err(RxError::new(RxErrorKind::ExternalService)
                .with_op(op.to_string())
                .with_path(path)
                .with_message("read rejected by fault injection"));
        }
        Ok(())
    }

    fn begin_write(&self, method: WriteMethod, path: &str) -> Result<()> {
        let injected = self
            .fail_next_write
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(message) = injected {
            return Err(RxError::action_failed(message).with_path(path));
        }
        self.writes
            .lock()
            .map(|mut w| {
                w.push(WriteRecord {
                    method,
                    path: path.to_string(),
                })
            })
            .ok();
        Ok(())
    }

    fn write_at(&self, path: &str, value: Option<Value>) {
        let segments: Vec<&str> = path_segments(path).collect();
        let mut root = self.root.lock().unwrap_or_else(|p| p.into_inner());
        set_at(&mut root, &segments, value);
    }

    fn read_at(&self, path: &str) -> Option<Value> {
        let root = self.root.lock().unwrap_or_else(|p| p.into_inner());
        node_at(&root, path).cloned()
    }
}

#[async_trait]
impl RtdbClient for MemoryDb {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.check_read("get", path)?;
        Ok(self.read_at(path))
    }

    async fn get_shallow(&self, path: &str) -> Result<Option<Value>> {
        self.check_read("get_shallow", path)?;
        Ok(self.read_at(path).map(|node| match node {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, _)| (k, Value::Bool(true)))
                    .collect(),
            ),
            scalar => scalar,
        }))
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.begin_write(WriteMethod::Set, path)?;
        self.write_at(path, normalize(value));
        Ok(())
    }

    async fn merge(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
        self.begin_write(WriteMethod::Merge, path)?;
        for (key, value) in partial {
            self.write_at(&join_path(path, &key), normalize(value));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.begin_write(WriteMethod::Delete, path)?;
        self.write_at(path, None);
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        self.begin_write(WriteMethod::Push, path)?;
        let key = self.push_ids.next_id();
        self.write_at(&join_path(path, &key), normalize(value));
        Ok(key)
    }

    async fn query(&self, path: &str, options: &QueryOptions) -> Result<Option<Value>> {
        self.check_read("query", path)?;
        let node = match self.read_at(path) {
            Some(Value::Object(map)) => map,
            other => return Ok(other),
        };
        let selected = run_query(node, options);
        Ok(if selected.is_empty() {
            None
        } else {
            Some(Value::Object(selected))
        })
    }
}

/// Apply the storage rules: drop nulls and empty objects, key arrays by index
fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => normalize(Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        )),
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        scalar => Some(scalar),
    }
}

fn node_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in path_segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

fn set_at(node: &mut Value, segments: &[&str], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let now_empty = match node.as_object_mut() {
        Some(map) => {
            let child = map.entry(head.to_string()).or_insert(Value::Null);
            set_at(child, rest, value);
            if child.is_null() {
                map.shift_remove(*head);
            }
            map.is_empty()
        }
        None => false,
    };
    if now_empty {
        *node = Value::Null;
    }
}

fn run_query(node: Map<String, Value>, options: &QueryOptions) -> Map<String, Value> {
    let order = options.order_by.clone().unwrap_or(OrderBy::Key);

    let mut entries: Vec<(String, Value)> = node.into_iter().collect();
    entries.sort_by(|(ka, va), (kb, vb)| match &order {
        OrderBy::Key => compare_keys(ka, kb),
        OrderBy::Value => compare_values(Some(va), Some(vb)).then_with(|| compare_keys(ka, kb)),
        OrderBy::Child(child) => compare_values(node_at(va, child), node_at(vb, child))
            .then_with(|| compare_keys(ka, kb)),
    });

    let bound_cmp = |key: &str, value: &Value, bound: &Value| -> Ordering {
        match &order {
            OrderBy::Key => {
                let bound_key = match bound {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                compare_keys(key, &bound_key)
            }
            OrderBy::Value => compare_values(Some(value), Some(bound)),
            OrderBy::Child(child) => compare_values(node_at(value, child), Some(bound)),
        }
    };

    entries.retain(|(k, v)| {
        options
            .start_at
            .as_ref()
            .map_or(true, |b| bound_cmp(k.as_str(), v, b) != Ordering::Less)
            && options
                .end_at
                .as_ref()
                .map_or(true, |b| bound_cmp(k.as_str(), v, b) != Ordering::Greater)
            && options
                .equal_to
                .as_ref()
                .map_or(true, |b| bound_cmp(k.as_str(), v, b) == Ordering::Equal)
    });

    if let Some(n) = options.limit_to_first {
        entries.truncate(n);
    }
    if let Some(n) = options.limit_to_last {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }

    entries.into_iter().collect()
}

/// Integer-like keys sort numerically before all other keys
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(false)) => 1,
        Some(Value::Bool(true)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 5,
    }
}

/// null < false < true < numbers < strings < objects
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| match (a, b) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            _ => Ordering::Equal,
        })
}
