//! Error handling for rtdbx-store
//!
//! Wraps rtdbx-core RxError with store-specific helpers

use rtdbx_core::errors::{RxError, RxErrorKind};

/// Result type alias using RxError
pub type Result<T> = std::result::Result<T, RxError>;

/// Create an IO error, mapping a missing file to `NotFound`
pub fn io_error(operation: &str, err: std::io::Error) -> RxError {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        RxErrorKind::NotFound
    } else {
        RxErrorKind::Io
    };
    RxError::new(kind)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a missing snapshot file error
pub fn snapshot_missing(file: &str) -> RxError {
    RxError::new(RxErrorKind::NotFound)
        .with_op("snapshot_load")
        .with_file(file)
        .with_message(format!("Snapshot file {} does not exist", file))
}

/// Create an error for a dump of a path that holds no value
pub fn remote_path_empty(path: &str) -> RxError {
    RxError::new(RxErrorKind::NotFound)
        .with_op("snapshot_dump")
        .with_path(path)
        .with_message(format!("Nothing stored at path '{}'", path))
}

/// Create a malformed snapshot document error
pub fn malformed_snapshot(file: &str, reason: &str) -> RxError {
    RxError::new(RxErrorKind::MalformedSnapshot)
        .with_op("snapshot_load")
        .with_file(file)
        .with_message(reason.to_string())
}

/// Create a corrupt ledger line error
pub fn corrupt_ledger(file: &str, line_no: usize, reason: &str) -> RxError {
    RxError::new(RxErrorKind::CorruptLedger)
        .with_op("ledger_list")
        .with_file(file)
        .with_message(format!("Unparseable ledger line {}: {}", line_no, reason))
}

/// Create an error for a snapshot store used without a codec
pub fn not_configured(operation: &str) -> RxError {
    RxError::new(RxErrorKind::NotConfigured)
        .with_op(operation.to_string())
        .with_message("Snapshot store has no codec attached")
}

/// Create a serialization error
pub fn serialization(operation: &str, reason: impl std::fmt::Display) -> RxError {
    RxError::new(RxErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}
