//! Snapshot document codec
//!
//! Serializes a subtree fetched from the remote database into a YAML document
//! and replays such a document back into the tree.
//!
//! Document layout:
//!
//! ```yaml
//! _path: users/abc        # source path, always present
//! name: Ada               # the subtree's own top-level children...
//! roles: { admin: true }
//! ```
//!
//! A scalar subtree, or an object that itself uses a reserved key, is stored
//! whole under `_value` instead.

use rtdbx_core::model::{join_path, ValueType};
use rtdbx_core::{log_op_end, log_op_error, log_op_start, CorrelationId, RtdbClient};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{
    io_error, malformed_snapshot, remote_path_empty, serialization, snapshot_missing, Result,
};
use crate::fs::atomic_write;
use crate::snapshot::filename::SnapshotNaming;

/// Reserved key holding the source path
pub const PATH_KEY: &str = "_path";
/// Reserved key holding a scalar subtree
pub const VALUE_KEY: &str = "_value";

/// Payload of a snapshot document
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotData {
    /// Top-level children of an object subtree
    Children(Map<String, Value>),
    /// Whole subtree stored under `_value`
    Whole(Value),
}

/// Parsed snapshot document
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDocument {
    pub path: String,
    pub data: SnapshotData,
}

impl SnapshotDocument {
    /// Wrap a fetched subtree
    pub fn from_value(path: &str, value: Value) -> Self {
        let data = match value {
            Value::Object(map)
                if !map.is_empty()
                    && !map.contains_key(PATH_KEY)
                    && !map.contains_key(VALUE_KEY) =>
            {
                SnapshotData::Children(map)
            }
            other => SnapshotData::Whole(other),
        };
        Self {
            path: path.to_string(),
            data,
        }
    }

    /// The subtree as it was fetched, with reserved keys removed
    pub fn into_value(self) -> Value {
        match self.data {
            SnapshotData::Children(map) => Value::Object(map),
            SnapshotData::Whole(value) => value,
        }
    }

    /// Render as YAML with `_path` first
    pub fn to_yaml(&self) -> Result<String> {
        let mut doc = Map::new();
        doc.insert(PATH_KEY.to_string(), Value::String(self.path.clone()));
        match &self.data {
            SnapshotData::Children(children) => {
                doc.extend(children.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            SnapshotData::Whole(value) => {
                doc.insert(VALUE_KEY.to_string(), value.clone());
            }
        }
        serde_yaml::to_string(&Value::Object(doc)).map_err(|e| serialization("snapshot_dump", e))
    }

    /// Parse a YAML document; `file` only labels errors
    pub fn from_yaml(text: &str, file: &str) -> Result<Self> {
        let parsed: Value = serde_yaml::from_str(text)
            .map_err(|e| malformed_snapshot(file, &format!("YAML parse error: {}", e)))?;

        let mut doc = match parsed {
            Value::Object(map) => map,
            other => {
                return Err(malformed_snapshot(
                    file,
                    &format!("expected a mapping, found {:?}", ValueType::of(&other)),
                ))
            }
        };

        let path = match doc.shift_remove(PATH_KEY) {
            Some(Value::String(path)) => path,
            Some(other) => {
                return Err(malformed_snapshot(
                    file,
                    &format!("{} must be a string, found {:?}", PATH_KEY, ValueType::of(&other)),
                ))
            }
            None => {
                return Err(malformed_snapshot(
                    file,
                    &format!("missing reserved {} key; no restore target", PATH_KEY),
                ))
            }
        };

        let data = match doc.shift_remove(VALUE_KEY) {
            Some(value) => {
                if !doc.is_empty() {
                    tracing::warn!(
                        file = %file,
                        ignored_keys = doc.len(),
                        "Snapshot has {} alongside other keys; using {} only",
                        VALUE_KEY,
                        VALUE_KEY
                    );
                }
                SnapshotData::Whole(value)
            }
            None => SnapshotData::Children(doc),
        };

        Ok(Self { path, data })
    }
}

/// Read and parse a snapshot document from any location
///
/// # Errors
///
/// - `NotFound` if the file does not exist
/// - `MalformedSnapshot` if it is not a valid snapshot document
pub async fn read_document(source: &Path) -> Result<SnapshotDocument> {
    let label = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let text = tokio::fs::read_to_string(source).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            snapshot_missing(&label)
        } else {
            io_error("snapshot_read", e)
        }
    })?;
    SnapshotDocument::from_yaml(&text, &label)
}

/// Progress of a chunked restore, reported after each sub-write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreProgress {
    /// 1-based index of the chunk just written
    pub index: usize,
    pub total: usize,
    pub key: String,
}

/// Observer for [`RestoreProgress`] notifications
pub type ProgressFn = dyn Fn(&RestoreProgress) + Send + Sync;

/// Reads subtrees into snapshot documents and writes them back
#[derive(Clone)]
pub struct SnapshotCodec {
    client: Arc<dyn RtdbClient>,
    naming: SnapshotNaming,
}

impl SnapshotCodec {
    pub fn new(client: Arc<dyn RtdbClient>) -> Self {
        Self {
            client,
            naming: SnapshotNaming::default(),
        }
    }

    /// Use a custom naming scheme for auto-generated filenames
    pub fn with_naming(mut self, naming: SnapshotNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn client(&self) -> &Arc<dyn RtdbClient> {
        &self.client
    }

    /// Fetch the subtree at `path` and write it as a snapshot document
    ///
    /// Without an explicit `filename` a fresh `{encodedPath}_{timestamp}` name
    /// is generated; an existing file is never reused for a generated name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is stored at `path`
    /// - `Io`/`Serialization` if the document cannot be written
    pub async fn dump(&self, path: &str, dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
        let start = Instant::now();
        log_op_start!("snapshot_dump", path = %path);

        let result = self.dump_inner(path, dir, filename).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(file) => {
                log_op_end!("snapshot_dump", duration_ms = duration_ms, file = %file.display());
            }
            Err(err) => log_op_error!("snapshot_dump", err, duration_ms = duration_ms),
        }
        result
    }

    async fn dump_inner(&self, path: &str, dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
        let value = self
            .client
            .get(path)
            .await?
            .ok_or_else(|| remote_path_empty(path))?;

        let yaml = SnapshotDocument::from_value(path, value).to_yaml()?;

        let target = match filename {
            Some(name) => dir.join(name),
            None => self.fresh_target(path, dir).await,
        };
        atomic_write(&target, yaml.as_bytes()).await?;

        tracing::debug!(file = %target.display(), size_bytes = yaml.len(), "Wrote snapshot document");
        Ok(target)
    }

    async fn fresh_target(&self, path: &str, dir: &Path) -> PathBuf {
        let mut at = chrono::Utc::now();
        loop {
            let candidate = dir.join(self.naming.file_name(
                None,
                path,
                &CorrelationId::from_timestamp(at),
            ));
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
            at += chrono::Duration::milliseconds(1);
        }
    }

    /// Replay a snapshot document into the tree and return its `_path`
    ///
    /// Documents with more than one top-level key are written one key at a
    /// time, in document order, with a progress notification after each.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file does not exist
    /// - `MalformedSnapshot` if the document has no `_path`
    /// - the remote client's error if any sub-write fails; earlier chunks stay written
    pub async fn load(
        &self,
        filename: &str,
        dir: &Path,
        progress: Option<&ProgressFn>,
    ) -> Result<String> {
        let start = Instant::now();
        log_op_start!("snapshot_load", file = %filename);

        let result = self.load_inner(filename, dir, progress).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(path) => {
                log_op_end!("snapshot_load", duration_ms = duration_ms, path = %path);
            }
            Err(err) => log_op_error!("snapshot_load", err, duration_ms = duration_ms),
        }
        result
    }

    async fn load_inner(
        &self,
        filename: &str,
        dir: &Path,
        progress: Option<&ProgressFn>,
    ) -> Result<String> {
        let doc = read_document(&dir.join(filename)).await?;
        self.write_document(doc, progress).await
    }

    /// Write an already-parsed document into the tree
    pub async fn write_document(
        &self,
        doc: SnapshotDocument,
        progress: Option<&ProgressFn>,
    ) -> Result<String> {
        let SnapshotDocument { path, data } = doc;

        match data {
            SnapshotData::Whole(Value::Object(map)) => {
                self.write_children(&path, map, progress).await?
            }
            SnapshotData::Whole(value) => self.client.set(&path, value).await?,
            SnapshotData::Children(map) => self.write_children(&path, map, progress).await?,
        }

        Ok(path)
    }

    async fn write_children(
        &self,
        path: &str,
        children: Map<String, Value>,
        progress: Option<&ProgressFn>,
    ) -> Result<()> {
        if children.len() <= 1 {
            return self.client.merge(path, children).await;
        }

        let total = children.len();
        for (i, (key, value)) in children.into_iter().enumerate() {
            let target = join_path(path, &key);
            match value {
                Value::Object(grandchildren) => self.client.merge(&target, grandchildren).await?,
                other => self.client.set(&target, other).await?,
            }

            let step = RestoreProgress {
                index: i + 1,
                total,
                key,
            };
            tracing::info!(
                op = "snapshot_load",
                event = rtdbx_core::schema::EVENT_RESTORE_PROGRESS,
                path = %path,
                key = %step.key,
                index = step.index,
                total = step.total,
                "Restored chunk {}/{}",
                step.index,
                step.total
            );
            if let Some(observer) = progress {
                observer(&step);
            }
        }
        Ok(())
    }
}
