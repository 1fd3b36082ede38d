//! Snapshot store (backup manager)
//!
//! Owns one directory of snapshot documents. Nothing else writes there, and
//! nothing is ever deleted. There is no index: listing decodes filenames.

use rtdbx_core::model::path_matches;
use rtdbx_core::{CorrelationId, OperationKind};
use std::path::{Path, PathBuf};

use crate::errors::{io_error, not_configured, Result};
use crate::fs::ensure_dir;
use crate::snapshot::codec::{ProgressFn, SnapshotCodec};
use crate::snapshot::filename::{SnapshotMeta, SnapshotNaming};

/// Filter for [`SnapshotStore::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    pub operation: Option<OperationKind>,
    /// Matches the path itself and everything beneath it
    pub path: Option<String>,
}

/// Directory of named snapshots
#[derive(Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    codec: Option<SnapshotCodec>,
    naming: SnapshotNaming,
}

impl SnapshotStore {
    /// Open the store at `dir`, creating the directory if needed
    ///
    /// A store without a codec can still list snapshots; `backup` and
    /// `restore` fail with `NotConfigured`.
    pub async fn open(dir: impl Into<PathBuf>, codec: Option<SnapshotCodec>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir).await?;
        Ok(Self {
            dir,
            codec,
            naming: SnapshotNaming::default(),
        })
    }

    /// Use a custom separator/extension for new and listed snapshots
    pub fn with_naming(mut self, naming: SnapshotNaming) -> Self {
        self.codec = self.codec.map(|c| c.with_naming(naming.clone()));
        self.naming = naming;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> &SnapshotNaming {
        &self.naming
    }

    fn codec(&self, operation: &str) -> Result<&SnapshotCodec> {
        self.codec.as_ref().ok_or_else(|| not_configured(operation))
    }

    /// Snapshot the subtree at `path`
    ///
    /// The filename is `[{op}_]{encodedPath}_{id}.{ext}`, where `id` is the
    /// correlation ID when given and the current time otherwise.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` if no codec is attached
    /// - any error from [`SnapshotCodec::dump`]
    pub async fn backup(
        &self,
        path: &str,
        operation: Option<OperationKind>,
        correlation_id: Option<&CorrelationId>,
    ) -> Result<PathBuf> {
        let codec = self.codec("snapshot_backup")?;
        let id = correlation_id.cloned().unwrap_or_else(CorrelationId::now);
        let file_name = self.naming.file_name(operation, path, &id);
        codec.dump(path, &self.dir, Some(&file_name)).await
    }

    /// List decodable snapshots, newest first
    ///
    /// Files that do not follow the filename grammar are skipped silently.
    ///
    /// # Errors
    ///
    /// `Io` if the directory cannot be read
    pub async fn list(&self, filter: &SnapshotFilter) -> Result<Vec<SnapshotMeta>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error("snapshot_list", e))?;

        let mut snapshots = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("snapshot_list", e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(meta) = self.naming.decode(&name) else {
                tracing::trace!(file = %name, "Skipping non-snapshot file");
                continue;
            };
            if filter.operation.is_some() && meta.operation != filter.operation {
                continue;
            }
            if let Some(path) = &filter.path {
                if !path_matches(&meta.path, path) {
                    continue;
                }
            }
            snapshots.push(meta);
        }

        snapshots.sort_by(|a, b| {
            b.correlation_id
                .cmp(&a.correlation_id)
                .then_with(|| b.file.cmp(&a.file))
        });
        Ok(snapshots)
    }

    /// Replay a named snapshot into the tree and return the restored path
    ///
    /// # Errors
    ///
    /// - `NotConfigured` if no codec is attached
    /// - any error from [`SnapshotCodec::load`]
    pub async fn restore(&self, file_name: &str, progress: Option<&ProgressFn>) -> Result<String> {
        let codec = self.codec("snapshot_restore")?;
        codec.load(file_name, &self.dir, progress).await
    }
}
