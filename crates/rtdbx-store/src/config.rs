//! Directory layout and naming settings for local persistence

use rtdbx_core::RtdbClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audit::AuditLedger;
use crate::cache::{ResultCache, DEFAULT_PREVIEW_CHARS, DEFAULT_THRESHOLD_BYTES};
use crate::errors::Result;
use crate::snapshot::filename::{DEFAULT_EXTENSION, DEFAULT_SEPARATOR};
use crate::snapshot::{SnapshotCodec, SnapshotNaming, SnapshotStore};

/// Where snapshots, the ledger and cached results live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backup_dir: PathBuf,
    pub audit_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub separator: char,
    pub extension: String,
    pub cache_threshold_bytes: usize,
    pub preview_chars: usize,
}

impl StoreConfig {
    /// Standard layout under one data directory:
    /// `backups/`, `audit/` and `cache/`
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let root = data_dir.as_ref();
        Self {
            backup_dir: root.join("backups"),
            audit_dir: root.join("audit"),
            cache_dir: root.join("cache"),
            separator: DEFAULT_SEPARATOR,
            extension: DEFAULT_EXTENSION.to_string(),
            cache_threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn naming(&self) -> SnapshotNaming {
        SnapshotNaming::new(self.separator, self.extension.clone())
    }

    /// Open a snapshot store with a codec bound to `client`
    ///
    /// # Errors
    ///
    /// `Io` if the backup directory cannot be created
    pub async fn open_snapshot_store(&self, client: Arc<dyn RtdbClient>) -> Result<SnapshotStore> {
        let codec = SnapshotCodec::new(client);
        Ok(SnapshotStore::open(&self.backup_dir, Some(codec))
            .await?
            .with_naming(self.naming()))
    }

    /// Open the audit ledger
    ///
    /// # Errors
    ///
    /// `Io` if the audit directory cannot be created
    pub async fn open_ledger(&self) -> Result<AuditLedger> {
        AuditLedger::open(&self.audit_dir).await
    }

    /// Open the result cache
    ///
    /// # Errors
    ///
    /// `Io` if the cache directory cannot be created
    pub async fn open_cache(&self) -> Result<ResultCache> {
        Ok(ResultCache::open(&self.cache_dir)
            .await?
            .with_threshold(self.cache_threshold_bytes)
            .with_preview_chars(self.preview_chars))
    }
}
