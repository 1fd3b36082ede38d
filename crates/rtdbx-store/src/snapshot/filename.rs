//! Snapshot filename grammar
//!
//! A snapshot's filename is its only metadata:
//!
//! ```text
//! [{op}_]{encodedPath}_{YYYY-MM-DDTHH-mm-ss-SSSZ}.{ext}
//! ```
//!
//! `encodedPath` is the RTDB path with leading/trailing slashes trimmed and
//! inner slashes replaced by the separator (default `.`); the root path
//! encodes as `root`.
//!
//! Decoding is best-effort. A path whose encoded form starts with an operation
//! prefix such as `push_` is read as carrying that operation, and a path
//! segment that itself contains the separator decodes with an extra `/`.
//! Neither case is rejected; listing simply reports what the name says.

use regex::Regex;
use rtdbx_core::model::normalize_path;
use rtdbx_core::{CorrelationId, OperationKind};
use serde::Serialize;
use std::sync::OnceLock;

/// Encoded form of the root path
pub const ROOT_TOKEN: &str = "root";

/// Default separator replacing `/` in encoded paths
pub const DEFAULT_SEPARATOR: char = '.';

/// Default snapshot file extension
pub const DEFAULT_EXTENSION: &str = "yaml";

fn suffix_regex() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"^(.*)_(\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}-\d{3}Z)$")
            .expect("snapshot suffix pattern is a valid regex")
    })
}

/// Metadata recovered from a snapshot filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub file: String,
    #[serde(rename = "op", skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKind>,
    pub path: String,
    #[serde(rename = "ts")]
    pub timestamp: String,
    pub correlation_id: CorrelationId,
}

/// Encoder/decoder for one separator and extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    separator: char,
    extension: String,
}

impl Default for SnapshotNaming {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR, DEFAULT_EXTENSION)
    }
}

impl SnapshotNaming {
    pub fn new(separator: char, extension: impl Into<String>) -> Self {
        Self {
            separator,
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Filesystem-safe form of an RTDB path
    pub fn encode_path(&self, path: &str) -> String {
        let trimmed = normalize_path(path);
        if trimmed.is_empty() {
            ROOT_TOKEN.to_string()
        } else {
            trimmed.replace('/', &self.separator.to_string())
        }
    }

    /// Inverse of [`encode_path`](Self::encode_path); the root token decodes to `/`
    pub fn decode_path(&self, encoded: &str) -> String {
        if encoded == ROOT_TOKEN {
            "/".to_string()
        } else {
            encoded.replace(self.separator, "/")
        }
    }

    /// Build `[{op}_]{encodedPath}_{id}.{ext}`
    pub fn file_name(
        &self,
        operation: Option<OperationKind>,
        path: &str,
        id: &CorrelationId,
    ) -> String {
        let prefix = operation
            .map(|op| format!("{}_", op.as_str()))
            .unwrap_or_default();
        format!(
            "{}{}_{}.{}",
            prefix,
            self.encode_path(path),
            id,
            self.extension
        )
    }

    /// Recover metadata from a filename, or `None` if it is not a snapshot name
    pub fn decode(&self, file_name: &str) -> Option<SnapshotMeta> {
        let base = file_name.strip_suffix(&format!(".{}", self.extension))?;

        let (operation, rest) = OperationKind::ALL
            .into_iter()
            .find_map(|op| {
                base.strip_prefix(op.as_str())
                    .and_then(|r| r.strip_prefix('_'))
                    .map(|r| (Some(op), r))
            })
            .unwrap_or((None, base));

        let captures = suffix_regex().captures(rest)?;
        let encoded_path = captures.get(1)?.as_str();
        let correlation_id = CorrelationId::from_string(captures.get(2)?.as_str().to_string());

        Some(SnapshotMeta {
            file: file_name.to_string(),
            operation,
            path: self.decode_path(encoded_path),
            timestamp: correlation_id.to_iso_timestamp(),
            correlation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> CorrelationId {
        CorrelationId::from_iso("2026-02-18T12:00:00.000Z")
    }

    #[test]
    fn test_encode_path() {
        let naming = SnapshotNaming::default();
        assert_eq!(naming.encode_path("users/abc"), "users.abc");
        assert_eq!(naming.encode_path("/users/abc/"), "users.abc");
        assert_eq!(naming.encode_path(""), "root");
        assert_eq!(naming.encode_path("/"), "root");
    }

    #[test]
    fn test_file_name_with_and_without_op() {
        let naming = SnapshotNaming::default();
        assert_eq!(
            naming.file_name(Some(OperationKind::Delete), "users/abc", &id()),
            "delete_users.abc_2026-02-18T12-00-00-000Z.yaml"
        );
        assert_eq!(
            naming.file_name(None, "/", &id()),
            "root_2026-02-18T12-00-00-000Z.yaml"
        );
    }

    #[test]
    fn test_decode_operation_snapshot() {
        let meta = SnapshotNaming::default()
            .decode("put_users.abc_2026-02-18T12-00-00-000Z.yaml")
            .unwrap();

        assert_eq!(meta.operation, Some(OperationKind::Put));
        assert_eq!(meta.path, "users/abc");
        assert_eq!(meta.timestamp, "2026-02-18T12:00:00.000Z");
        assert_eq!(meta.correlation_id.as_str(), "2026-02-18T12-00-00-000Z");
    }

    #[test]
    fn test_decode_manual_root_snapshot() {
        let meta = SnapshotNaming::default()
            .decode("root_2026-02-17T09-00-00-000Z.yaml")
            .unwrap();

        assert_eq!(meta.operation, None);
        assert_eq!(meta.path, "/");
    }

    #[test]
    fn test_decode_rejects_foreign_files() {
        let naming = SnapshotNaming::default();
        assert!(naming.decode("notes.txt").is_none());
        assert!(naming.decode("users.abc.yaml").is_none());
        assert!(naming.decode("put_users_2026-02-18.yaml").is_none());
        assert!(naming
            .decode("put_users.abc_2026-02-18T12-00-00-000Z.json")
            .is_none());
    }

    #[test]
    fn test_decode_path_that_looks_like_an_operation() {
        // `push_events` is indistinguishable from a push snapshot of `events`
        let naming = SnapshotNaming::default();
        let name = naming.file_name(None, "push_events", &id());
        let meta = naming.decode(&name).unwrap();

        assert_eq!(meta.operation, Some(OperationKind::Push));
        assert_eq!(meta.path, "events");
    }

    #[test]
    fn test_custom_separator_and_extension() {
        let naming = SnapshotNaming::new('~', ".yml");
        let name = naming.file_name(Some(OperationKind::Patch), "a/b.c", &id());
        assert_eq!(name, "patch_a~b.c_2026-02-18T12-00-00-000Z.yml");
        assert_eq!(naming.decode(&name).unwrap().path, "a/b.c");
    }
}
