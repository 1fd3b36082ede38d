//! Operation kinds and RTDB path helpers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::{RxError, RxErrorKind};

/// Kind of mutating operation, used to tag ledger entries and snapshot filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Replace the value at a path
    Put,
    /// Merge children into the value at a path
    Patch,
    /// Remove the value at a path
    Delete,
    /// Append a child under a generated key
    Push,
    /// Restore or import a snapshot document
    Load,
}

impl OperationKind {
    /// All kinds, in the fixed priority order used when decoding filename prefixes
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Put,
        OperationKind::Patch,
        OperationKind::Delete,
        OperationKind::Push,
        OperationKind::Load,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Put => "put",
            OperationKind::Patch => "patch",
            OperationKind::Delete => "delete",
            OperationKind::Push => "push",
            OperationKind::Load => "load",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| {
                RxError::new(RxErrorKind::InvalidInput)
                    .with_op("parse_operation_kind")
                    .with_message(format!(
                        "unknown operation kind '{}', expected one of put, patch, delete, push, load",
                        s
                    ))
            })
    }
}

/// JSON type of a value, used by read-path summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

/// Strip leading and trailing slashes; the root path normalizes to `""`
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Append a child key to a path without doubling slashes
pub fn join_path(base: &str, key: &str) -> String {
    let base = normalize_path(base);
    let key = normalize_path(key);
    match (base.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, key),
    }
}

/// Split a path into its non-empty segments
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Prefix filter shared by ledger and snapshot listings
///
/// A candidate matches when it equals the filter or lies beneath it
/// (`filter + "/"` prefix). Both sides are compared after slash
/// normalization, so an empty filter matches everything.
pub fn path_matches(candidate: &str, filter: &str) -> bool {
    let filter = normalize_path(filter);
    if filter.is_empty() {
        return true;
    }
    let candidate = normalize_path(candidate);
    candidate == filter
        || (candidate.len() > filter.len()
            && candidate.starts_with(filter)
            && candidate.as_bytes()[filter.len()] == b'/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_round_trip_through_str() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
        assert_eq!(
            "merge".parse::<OperationKind>().unwrap_err().kind(),
            RxErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_operation_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&OperationKind::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
    }

    #[test]
    fn test_value_type_of() {
        assert_eq!(ValueType::of(&serde_json::json!({"a": 1})), ValueType::Object);
        assert_eq!(ValueType::of(&serde_json::json!([1])), ValueType::Array);
        assert_eq!(ValueType::of(&serde_json::json!("x")), ValueType::String);
        assert!(!ValueType::of(&serde_json::json!(true)).is_structured());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("users", "abc"), "users/abc");
        assert_eq!(join_path("/users/", "/abc"), "users/abc");
        assert_eq!(join_path("", "abc"), "abc");
        assert_eq!(join_path("/", "abc"), "abc");
    }

    #[test]
    fn test_path_matches_equality_and_children_only() {
        assert!(path_matches("users", "users"));
        assert!(path_matches("users/abc", "users"));
        assert!(path_matches("/users/abc/", "users/"));
        assert!(!path_matches("users_archive", "users"));
        assert!(!path_matches("usersabc", "users"));
        assert!(!path_matches("orders", "users"));
        assert!(path_matches("anything", "/"));
    }
}
