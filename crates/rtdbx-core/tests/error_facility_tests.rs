use rtdbx_core::errors::{RxError, RxErrorKind};
use rtdbx_core::{CorrelationId, OperationKind};
use std::error::Error;

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (RxErrorKind::NotFound, "ERR_NOT_FOUND"),
        (RxErrorKind::MalformedSnapshot, "ERR_MALFORMED_SNAPSHOT"),
        (RxErrorKind::CorruptLedger, "ERR_CORRUPT_LEDGER"),
        (RxErrorKind::NotConfigured, "ERR_NOT_CONFIGURED"),
        (RxErrorKind::BackupFailed, "ERR_BACKUP_FAILED"),
        (RxErrorKind::ActionFailed, "ERR_ACTION_FAILED"),
        (RxErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_builder_carries_context() {
    let id = CorrelationId::from_iso("2026-02-18T12:00:00.000Z");
    let err = RxError::new(RxErrorKind::BackupFailed)
        .with_op("write_guard")
        .with_path("users/abc")
        .with_correlation_id(id.clone())
        .with_message("permission denied");

    assert_eq!(err.kind(), RxErrorKind::BackupFailed);
    assert_eq!(err.op(), Some("write_guard"));
    assert_eq!(err.path(), Some("users/abc"));
    assert_eq!(err.correlation_id(), Some(&id));
    assert_eq!(err.message(), "permission denied");
}

#[test]
fn test_action_failed_keeps_message_verbatim() {
    let err = RxError::action_failed("network timeout");

    assert_eq!(err.kind(), RxErrorKind::ActionFailed);
    assert_eq!(err.message(), "network timeout");
    assert!(err.to_string().contains("network timeout"));
}

#[test]
fn test_source_chain_is_exposed() {
    let cause = RxError::new(RxErrorKind::Io).with_message("disk full");
    let err = RxError::new(RxErrorKind::BackupFailed).with_source(cause);

    assert_eq!(err.source_error().map(|e| e.kind()), Some(RxErrorKind::Io));
    assert!(err.source().unwrap().to_string().contains("disk full"));
}

#[test]
fn test_serde_json_error_converts_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err: RxError = json_err.into();

    assert_eq!(err.kind(), RxErrorKind::Serialization);
}

#[test]
fn test_unknown_operation_is_invalid_input() {
    let err = "upsert".parse::<OperationKind>().unwrap_err();

    assert_eq!(err.kind(), RxErrorKind::InvalidInput);
    assert_eq!("delete".parse::<OperationKind>().unwrap(), OperationKind::Delete);
}
