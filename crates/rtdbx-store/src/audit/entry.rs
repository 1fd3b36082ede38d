//! One ledger record per guarded write

use rtdbx_core::{CorrelationId, OperationKind};
use serde::{Deserialize, Serialize};

/// Outcome of a write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Ok,
    Error,
}

/// Immutable record of one write attempt, serialized as one JSON line
///
/// ```json
/// {"id":"2026-02-18T12-00-00-000Z","ts":"2026-02-18T12:00:00.000Z","op":"delete","path":"users/abc","status":"ok","backupFile":"delete_users.abc_2026-02-18T12-00-00-000Z.yaml","durationMs":42}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: CorrelationId,
    pub ts: String,
    pub op: OperationKind,
    pub path: String,
    pub status: AuditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Time spent in the write itself, excluding the snapshot
    pub duration_ms: u64,
}

impl AuditEntry {
    /// Record a successful write
    pub fn succeeded(
        id: CorrelationId,
        op: OperationKind,
        path: impl Into<String>,
        backup_file: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            ts: id.to_iso_timestamp(),
            id,
            op,
            path: path.into(),
            status: AuditStatus::Ok,
            backup_file,
            error_message: None,
            duration_ms,
        }
    }

    /// Record a failed write
    pub fn failed(
        id: CorrelationId,
        op: OperationKind,
        path: impl Into<String>,
        backup_file: Option<String>,
        error_message: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            ts: id.to_iso_timestamp(),
            id,
            op,
            path: path.into(),
            status: AuditStatus::Error,
            backup_file,
            error_message: Some(error_message.into()),
            duration_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AuditStatus::Ok
    }
}
