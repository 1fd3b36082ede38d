//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use crate::errors::{io_error, Result};
use std::path::Path;
use tokio::fs;

/// Create a directory and its parents if missing
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| io_error("create_dir", e))
}

/// Atomically write bytes to a file
///
/// The temp file sits next to the target so the rename never crosses a
/// filesystem boundary. Readers see either the old file or the complete new one.
pub async fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        ensure_dir(parent).await?;
    }

    let mut temp_name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = target_path.with_file_name(temp_name);

    fs::write(&temp_path, content)
        .await
        .map_err(|e| io_error("write_temp", e))?;

    fs::rename(&temp_path, target_path)
        .await
        .map_err(|e| io_error("rename_temp", e))?;

    Ok(())
}
