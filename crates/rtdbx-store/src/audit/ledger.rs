//! Line-oriented audit ledger
//!
//! The ledger is a single newline-delimited JSON file opened in append mode
//! for every write, so appends from one process never overwrite each other.
//! No ordering is guaranteed between processes sharing a ledger.

use chrono::{TimeZone, Utc};
use rtdbx_core::model::path_matches;
use rtdbx_core::{CorrelationId, OperationKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncWriteExt;

use crate::audit::entry::AuditEntry;
use crate::errors::{corrupt_ledger, io_error, serialization, Result};
use crate::fs::ensure_dir;

/// Ledger file inside the ledger directory
pub const LEDGER_FILE_NAME: &str = "audit.jsonl";

/// Last millisecond handed out as a correlation ID, shared by every ledger in the process
static LAST_ID_MS: AtomicI64 = AtomicI64::new(0);

/// Filter for [`AuditLedger::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub operation: Option<OperationKind>,
    /// Matches the path itself and everything beneath it
    pub path_prefix: Option<String>,
    pub limit: Option<usize>,
}

/// Append-only record of write attempts
#[derive(Debug, Clone)]
pub struct AuditLedger {
    file: PathBuf,
    enabled: bool,
}

impl AuditLedger {
    /// Open the ledger in `dir`, creating the directory if needed
    ///
    /// The ledger file itself is created on first append.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        ensure_dir(dir).await?;
        Ok(Self {
            file: dir.join(LEDGER_FILE_NAME),
            enabled: true,
        })
    }

    /// Enable or disable appends; listing works either way
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Generate a correlation ID
    ///
    /// IDs are strictly increasing within the process: a request in the same
    /// millisecond as the previous one is moved to the next millisecond, so
    /// two writes never share a snapshot filename.
    pub fn next_id(&self) -> CorrelationId {
        let now_ms = Utc::now().timestamp_millis();
        let previous = LAST_ID_MS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or(now_ms);
        let ms = now_ms.max(previous + 1);

        match Utc.timestamp_millis_opt(ms).single() {
            Some(ts) => CorrelationId::from_timestamp(ts),
            None => CorrelationId::now(),
        }
    }

    /// Append one entry as a single line and flush
    ///
    /// # Errors
    ///
    /// `Io` if the ledger cannot be opened or written
    pub async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| serialization("ledger_append", e))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .await
            .map_err(|e| io_error("ledger_open", e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_error("ledger_append", e))?;
        file.flush()
            .await
            .map_err(|e| io_error("ledger_flush", e))?;

        tracing::debug!(
            correlation_id = %entry.id,
            op = %entry.op,
            path = %entry.path,
            status = ?entry.status,
            "Appended audit entry"
        );
        Ok(())
    }

    /// Read matching entries, newest first
    ///
    /// A missing ledger file yields an empty list.
    ///
    /// # Errors
    ///
    /// - `CorruptLedger` if any non-blank line fails to parse
    /// - `Io` if the file exists but cannot be read
    pub async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        let text = match tokio::fs::read_to_string(&self.file).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("ledger_read", e)),
        };

        let file_label = self.file.display().to_string();
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(line)
                .map_err(|e| corrupt_ledger(&file_label, i + 1, &e.to_string()))?;

            if filter.operation.is_some_and(|op| op != entry.op) {
                continue;
            }
            if let Some(prefix) = &filter.path_prefix {
                if !path_matches(&entry.path, prefix) {
                    continue;
                }
            }
            entries.push(entry);
        }

        entries.reverse();
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
