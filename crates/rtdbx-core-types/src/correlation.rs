//! Correlation identifiers for write tracking
//!
//! A correlation ID ties one audit ledger entry to the snapshot taken before
//! the write it records. IDs are derived from a UTC timestamp with the `:` and
//! `.` separators replaced by `-`, so they are safe to embed in filenames and
//! sort lexicographically in time order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Length of a rendered correlation ID (`YYYY-MM-DDTHH-mm-ss-SSSZ`)
pub const CORRELATION_ID_LEN: usize = 24;

/// Filesystem-safe, timestamp-derived identifier for a single write attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Derive an ID from the current wall-clock time
    pub fn now() -> Self {
        Self::from_timestamp(Utc::now())
    }

    /// Derive an ID from a timestamp, truncated to millisecond precision
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self::from_iso(&to_iso_millis(ts))
    }

    /// Derive an ID from an ISO-8601 string such as `2026-02-18T12:00:00.000Z`
    pub fn from_iso(iso: &str) -> Self {
        Self(iso.replace([':', '.'], "-"))
    }

    /// Accept a string only if it has the exact correlation ID shape
    pub fn parse(s: &str) -> Option<Self> {
        if is_correlation_shape(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the ISO-8601 timestamp the ID was derived from
    ///
    /// Re-inserts the two colons and the milliseconds dot. IDs that were not
    /// produced by this type (see [`CorrelationId::from_string`]) are returned
    /// unchanged.
    pub fn to_iso_timestamp(&self) -> String {
        if !is_correlation_shape(&self.0) {
            return self.0.clone();
        }
        let s = &self.0;
        format!(
            "{}:{}:{}.{}Z",
            &s[0..13],
            &s[14..16],
            &s[17..19],
            &s[20..23]
        )
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a timestamp as ISO-8601 with millisecond precision and a `Z` suffix
pub fn to_iso_millis(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Check the `YYYY-MM-DDTHH-mm-ss-SSSZ` shape without validating the calendar
fn is_correlation_shape(s: &str) -> bool {
    const SHAPE: &[u8] = b"dddd-dd-ddTdd-dd-dd-dddZ";
    let bytes = s.as_bytes();
    bytes.len() == SHAPE.len()
        && bytes.iter().zip(SHAPE).all(|(b, want)| match want {
            b'd' => b.is_ascii_digit(),
            other => b == other,
        })
}
