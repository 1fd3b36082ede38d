//! Write guard
//!
//! Wraps one mutating call with the safety net:
//!
//! 1. generate a correlation ID
//! 2. snapshot the target path if the operation is configured for backup
//! 3. run the write, timing only the write
//! 4. append one ledger entry, whatever the outcome
//!
//! A failed snapshot never blocks the write. It is reported on the
//! `backup_failed` warning event and shows up as a ledger entry without
//! `backupFile`. A failed write is recorded and then returned unchanged.
//!
//! ## Logging Ownership
//!
//! The guard owns lifecycle logging for `write_guard`; the store layer only
//! emits debug events and its own codec boundaries.

use rtdbx_core::schema::EVENT_BACKUP_FAILED;
use rtdbx_core::{
    log_op_end, log_op_error, log_op_start, CorrelationId, OperationKind, Result, RxError,
    RxErrorKind,
};
use rtdbx_store::{AuditEntry, AuditLedger, SnapshotStore};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use std::time::Instant;

use crate::config::GuardConfig;

/// What a guarded write produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardOutcome<T> {
    pub result: T,
    pub correlation_id: CorrelationId,
    /// Snapshot taken before the write, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<String>,
}

/// Result of the pre-write snapshot, kept apart from the write's own result
#[derive(Debug)]
enum BackupOutcome {
    Created(String),
    Skipped,
    Failed(RxError),
}

impl BackupOutcome {
    fn into_file(self) -> Option<String> {
        match self {
            BackupOutcome::Created(file) => Some(file),
            BackupOutcome::Skipped | BackupOutcome::Failed(_) => None,
        }
    }
}

/// Coordinates the snapshot store and the audit ledger around writes
///
/// Holds no state of its own beyond configuration; either collaborator may
/// be absent, in which case its step is skipped.
#[derive(Clone, Default)]
pub struct WriteGuard {
    snapshots: Option<SnapshotStore>,
    ledger: Option<AuditLedger>,
    config: GuardConfig,
}

impl WriteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            snapshots: None,
            ledger: None,
            config,
        }
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotStore) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_ledger(mut self, ledger: AuditLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn snapshots(&self) -> Option<&SnapshotStore> {
        self.snapshots.as_ref()
    }

    pub fn ledger(&self) -> Option<&AuditLedger> {
        self.ledger.as_ref()
    }

    fn active_ledger(&self) -> Option<&AuditLedger> {
        self.ledger
            .as_ref()
            .filter(|l| self.config.ledger_enabled && l.is_enabled())
    }

    fn next_id(&self) -> CorrelationId {
        match &self.ledger {
            Some(ledger) => ledger.next_id(),
            None => CorrelationId::now(),
        }
    }

    /// Run `action` under the safety net
    ///
    /// # Errors
    ///
    /// - the action's own error, unchanged, after it has been recorded
    /// - `Io` if the write succeeded but its ledger entry could not be appended
    pub async fn run<T, F, Fut>(
        &self,
        op: OperationKind,
        path: &str,
        action: F,
    ) -> Result<GuardOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let correlation_id = self.next_id();
        log_op_start!(
            "write_guard",
            operation_kind = %op,
            path = %path,
            correlation_id = %correlation_id
        );

        let backup = self.attempt_backup(op, path, &correlation_id).await;
        let backup_file = backup.into_file();

        let start = Instant::now();
        let result = action().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let entry = match &result {
            Ok(_) => AuditEntry::succeeded(
                correlation_id.clone(),
                op,
                path,
                backup_file.clone(),
                duration_ms,
            ),
            Err(err) => AuditEntry::failed(
                correlation_id.clone(),
                op,
                path,
                backup_file.clone(),
                err.message(),
                duration_ms,
            ),
        };
        let recorded = match self.active_ledger() {
            Some(ledger) => ledger.append(&entry).await,
            None => Ok(()),
        };

        match result {
            Ok(value) => {
                if let Err(err) = recorded {
                    let err = err.with_correlation_id(correlation_id);
                    log_op_error!(
                        "write_guard",
                        err,
                        duration_ms = duration_ms,
                        correlation_id = %entry.id
                    );
                    return Err(err);
                }
                log_op_end!(
                    "write_guard",
                    duration_ms = duration_ms,
                    correlation_id = %correlation_id,
                    backup_file = backup_file.as_deref().unwrap_or("")
                );
                Ok(GuardOutcome {
                    result: value,
                    correlation_id,
                    backup_file,
                })
            }
            Err(err) => {
                if let Err(ledger_err) = recorded {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        error = %ledger_err,
                        "Could not record failed write"
                    );
                }
                log_op_error!(
                    "write_guard",
                    err,
                    duration_ms = duration_ms,
                    correlation_id = %correlation_id
                );
                Err(err)
            }
        }
    }

    async fn attempt_backup(
        &self,
        op: OperationKind,
        path: &str,
        correlation_id: &CorrelationId,
    ) -> BackupOutcome {
        if !self.config.should_backup(op) {
            return BackupOutcome::Skipped;
        }
        let Some(store) = &self.snapshots else {
            return BackupOutcome::Skipped;
        };

        let outcome = match store.backup(path, Some(op), Some(correlation_id)).await {
            Ok(file) => BackupOutcome::Created(file_name(&file)),
            Err(cause) if cause.kind() == RxErrorKind::NotFound => {
                tracing::debug!(
                    path = %path,
                    correlation_id = %correlation_id,
                    "Nothing stored at path, no snapshot taken"
                );
                BackupOutcome::Skipped
            }
            Err(cause) => BackupOutcome::Failed(
                RxError::new(RxErrorKind::BackupFailed)
                    .with_op("write_guard")
                    .with_path(path)
                    .with_correlation_id(correlation_id.clone())
                    .with_message(cause.message().to_string())
                    .with_source(cause),
            ),
        };

        if let BackupOutcome::Failed(err) = &outcome {
            tracing::warn!(
                component = module_path!(),
                op = "write_guard",
                event = EVENT_BACKUP_FAILED,
                operation_kind = %op,
                path = %path,
                correlation_id = %correlation_id,
                err.code = err.source_error().map_or(err.code(), RxError::code),
                error = %err,
                "Pre-write snapshot failed, continuing with the write"
            );
        }
        outcome
    }
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| file.display().to_string())
}
