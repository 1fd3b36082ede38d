//! Read commands and the shallow summary
//!
//! Reads are not guarded or audited. A result larger than the cache
//! threshold is written to the result cache and replaced by a summary.

use rtdbx_core::{log_op_end, log_op_error, log_op_start, QueryOptions, Result, RtdbClient};
use rtdbx_store::{ReadResult, ResultCache};
use serde_json::{json, Map, Value};
use std::time::Instant;

/// Read-only operations against the remote tree
#[derive(Debug, Clone, PartialEq)]
pub enum ReadCommand {
    /// Fetch the subtree at `path`; `shallow` summarizes nested children
    Get { path: String, shallow: bool },
    /// List only the child keys of `path`
    Keys { path: String },
    /// Ordered, ranged, limited children of `path`
    Query { path: String, options: QueryOptions },
}

impl ReadCommand {
    pub fn path(&self) -> &str {
        match self {
            ReadCommand::Get { path, .. }
            | ReadCommand::Keys { path }
            | ReadCommand::Query { path, .. } => path,
        }
    }

    fn op_name(&self) -> &'static str {
        match self {
            ReadCommand::Get { .. } => "read_get",
            ReadCommand::Keys { .. } => "read_keys",
            ReadCommand::Query { .. } => "read_query",
        }
    }
}

/// Apply a read command
///
/// An absent value reads as `null`. Without a cache every result is
/// returned inline.
///
/// # Errors
///
/// - the remote client's error if the read fails
/// - `Io`/`Serialization` if a large result cannot be cached
pub async fn apply_read_command(
    cmd: ReadCommand,
    client: &dyn RtdbClient,
    cache: Option<&ResultCache>,
) -> Result<ReadResult> {
    let op = cmd.op_name();
    log_op_start!(op, path = cmd.path());
    let start = Instant::now();

    let result = read(&cmd, client, cache).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms);
        }
        Err(err) => log_op_error!(op, err, duration_ms = duration_ms, path = cmd.path()),
    }
    result
}

async fn read(
    cmd: &ReadCommand,
    client: &dyn RtdbClient,
    cache: Option<&ResultCache>,
) -> Result<ReadResult> {
    let value = match cmd {
        ReadCommand::Get { path, shallow } => {
            let value = client.get(path).await?;
            if *shallow {
                value.map(shallow_summary)
            } else {
                value
            }
        }
        ReadCommand::Keys { path } => client.get_shallow(path).await?,
        ReadCommand::Query { path, options } => client.query(path, options).await?,
    }
    .unwrap_or(Value::Null);

    match cache {
        Some(cache) => cache.maybe_cache(cmd.path(), value).await,
        None => Ok(ReadResult::Inline(value)),
    }
}

/// Replace every structured child of an object with a type/count summary
///
/// ```
/// # use rtdbx_engine::shallow_summary;
/// # use serde_json::json;
/// let summary = shallow_summary(json!({"name": "Ada", "roles": {"admin": true}}));
/// assert_eq!(
///     summary,
///     json!({"name": "Ada", "roles": {"_type": "object", "_children": 1}})
/// );
/// ```
///
/// Scalars are returned unchanged; a top-level array is summarized per item.
pub fn shallow_summary(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, summarize(child)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(summarize).collect()),
        scalar => scalar,
    }
}

fn summarize(value: Value) -> Value {
    match value {
        Value::Object(map) => json!({ "_type": "object", "_children": map.len() }),
        Value::Array(items) => json!({ "_type": "array", "_length": items.len() }),
        scalar => scalar,
    }
}
