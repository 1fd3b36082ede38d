//! Content-addressed file cache for large read results
//!
//! A result whose serialized size exceeds the threshold is written to
//! `{dir}/{sha256}.json` and replaced by a compact summary. Identical results
//! land in the same file, so caching is idempotent.

use rtdbx_core::ValueType;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::errors::{serialization, Result};
use crate::fs::{atomic_write, ensure_dir};

/// Default size above which results are cached
pub const DEFAULT_THRESHOLD_BYTES: usize = 50_000;

/// Default preview length in characters
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Summary returned in place of a cached payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub file: String,
    pub path: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
    pub preview: String,
}

/// A read result, either inline or summarized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadResult {
    Inline(Value),
    Cached(CachedResult),
}

/// Cache directory plus size policy
#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
    threshold_bytes: usize,
    preview_chars: usize,
}

impl ResultCache {
    /// Open the cache at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir).await?;
        Ok(Self {
            dir,
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        })
    }

    pub fn with_threshold(mut self, threshold_bytes: usize) -> Self {
        self.threshold_bytes = threshold_bytes;
        self
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Return the value inline, or cache it and return a summary if it is too large
    ///
    /// # Errors
    ///
    /// `Serialization`/`Io` if a large value cannot be written
    pub async fn maybe_cache(&self, path: &str, value: Value) -> Result<ReadResult> {
        let rendered =
            serde_json::to_string_pretty(&value).map_err(|e| serialization("cache_store", e))?;
        if rendered.len() <= self.threshold_bytes {
            return Ok(ReadResult::Inline(value));
        }
        self.store_rendered(path, &value, rendered).await.map(ReadResult::Cached)
    }

    /// Write a value to the cache unconditionally
    ///
    /// # Errors
    ///
    /// `Serialization`/`Io` if the value cannot be written
    pub async fn store(&self, path: &str, value: &Value) -> Result<CachedResult> {
        let rendered =
            serde_json::to_string_pretty(value).map_err(|e| serialization("cache_store", e))?;
        self.store_rendered(path, value, rendered).await
    }

    async fn store_rendered(
        &self,
        path: &str,
        value: &Value,
        rendered: String,
    ) -> Result<CachedResult> {
        let digest = hex::encode(Sha256::digest(rendered.as_bytes()));
        let target = self.dir.join(format!("{}.json", digest));
        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            atomic_write(&target, rendered.as_bytes()).await?;
        }

        let child_count = match value {
            Value::Object(map) => Some(map.len()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        };

        tracing::debug!(
            path = %path,
            file = %target.display(),
            size_bytes = rendered.len(),
            "Cached large read result"
        );

        Ok(CachedResult {
            file: target.display().to_string(),
            path: path.to_string(),
            value_type: ValueType::of(value),
            size_bytes: rendered.len(),
            child_count,
            preview: preview(&rendered, self.preview_chars),
        })
    }
}

fn preview(rendered: &str, max_chars: usize) -> String {
    match rendered.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &rendered[..cut]),
        None => rendered.to_string(),
    }
}
