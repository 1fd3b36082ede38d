//! Remote database collaborator contract
//!
//! The write-safety layer never talks to a concrete database. It consumes this
//! capability set, which the REST client and the in-process [`MemoryDb`]
//! both implement.
//!
//! [`MemoryDb`]: crate::memory::MemoryDb

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::Result;

/// Child ordering for [`RtdbClient::query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    Key,
    Value,
    Child(String),
}

/// Ordering, range and limit constraints for a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub order_by: Option<OrderBy>,
    pub start_at: Option<Value>,
    pub end_at: Option<Value>,
    pub equal_to: Option<Value>,
    pub limit_to_first: Option<usize>,
    pub limit_to_last: Option<usize>,
}

impl QueryOptions {
    pub fn is_empty(&self) -> bool {
        *self == QueryOptions::default()
    }
}

/// Capability set offered by a hierarchical key-value database
///
/// Paths are slash-delimited; `""` and `"/"` both address the root. An absent
/// value is reported as `None`, never as `Some(Value::Null)`.
#[async_trait]
pub trait RtdbClient: Send + Sync {
    /// Fetch the full subtree at `path`
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Fetch only the immediate child keys at `path`, each mapped to `true`
    /// (scalars are returned as-is)
    async fn get_shallow(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the value at `path`
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Replace each named child of `path` with the given value
    async fn merge(&self, path: &str, partial: Map<String, Value>) -> Result<()>;

    /// Remove the value at `path`
    async fn delete(&self, path: &str) -> Result<()>;

    /// Append `value` under a generated, chronologically sortable key
    async fn push(&self, path: &str, value: Value) -> Result<String>;

    /// Fetch the children of `path` filtered and ordered by `options`
    async fn query(&self, path: &str, options: &QueryOptions) -> Result<Option<Value>>;
}
