//! Write commands

use rtdbx_core::model::join_path;
use rtdbx_core::{OperationKind, Result, RtdbClient};
use rtdbx_store::snapshot::{read_document, ProgressFn, SnapshotCodec};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::guard::{GuardOutcome, WriteGuard};

/// Mutating operations against the remote tree
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCommand {
    /// Replace the value at `path`
    Put { path: String, value: Value },
    /// Replace the named children of `path`
    Patch {
        path: String,
        values: Map<String, Value>,
    },
    Delete { path: String },
    /// Append `value` under a generated key
    Push { path: String, value: Value },
    /// Import a snapshot document into the path it names
    Load { file: PathBuf },
}

impl WriteCommand {
    pub fn kind(&self) -> OperationKind {
        match self {
            WriteCommand::Put { .. } => OperationKind::Put,
            WriteCommand::Patch { .. } => OperationKind::Patch,
            WriteCommand::Delete { .. } => OperationKind::Delete,
            WriteCommand::Push { .. } => OperationKind::Push,
            WriteCommand::Load { .. } => OperationKind::Load,
        }
    }
}

/// Correlation ID, pre-write snapshot and command result
pub type WriteOutcome = GuardOutcome<Value>;

/// Apply a write command under the write guard
///
/// `Load` reads and validates the document before the guard runs, so a
/// missing or malformed file is reported without a ledger entry. The target
/// path of a load is the document's `_path`.
///
/// # Errors
///
/// - `NotFound`/`MalformedSnapshot` for an unreadable `Load` document
/// - the remote client's error for a failed write, after it is recorded
pub async fn apply_write_command(
    cmd: WriteCommand,
    client: &Arc<dyn RtdbClient>,
    guard: &WriteGuard,
    progress: Option<&ProgressFn>,
) -> Result<WriteOutcome> {
    let op = cmd.kind();
    match cmd {
        WriteCommand::Put { path, value } => {
            guard
                .run(op, &path, || async {
                    client.set(&path, value).await.map(|()| json!({ "path": path }))
                })
                .await
        }
        WriteCommand::Patch { path, values } => {
            guard
                .run(op, &path, || async {
                    let keys: Vec<String> = values.keys().cloned().collect();
                    client
                        .merge(&path, values)
                        .await
                        .map(|()| json!({ "path": path, "updated": keys }))
                })
                .await
        }
        WriteCommand::Delete { path } => {
            guard
                .run(op, &path, || async {
                    client.delete(&path).await.map(|()| json!({ "path": path }))
                })
                .await
        }
        WriteCommand::Push { path, value } => {
            guard
                .run(op, &path, || async {
                    client
                        .push(&path, value)
                        .await
                        .map(|key| json!({ "key": key, "path": join_path(&path, &key) }))
                })
                .await
        }
        WriteCommand::Load { file } => {
            let doc = read_document(&file).await?;
            let target = doc.path.clone();
            let codec = SnapshotCodec::new(client.clone());
            guard
                .run(op, &target, || async {
                    codec
                        .write_document(doc, progress)
                        .await
                        .map(|restored| json!({ "path": restored }))
                })
                .await
        }
    }
}
