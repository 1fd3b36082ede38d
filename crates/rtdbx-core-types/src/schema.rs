//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_CORRELATION_ID: &str = "correlation_id";

// Write-safety identifiers
pub const FIELD_PATH: &str = "path";
pub const FIELD_OPERATION_KIND: &str = "operation_kind";
pub const FIELD_BACKUP_FILE: &str = "backup_file";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_BACKUP_FAILED: &str = "backup_failed";
pub const EVENT_RESTORE_PROGRESS: &str = "restore_progress";
