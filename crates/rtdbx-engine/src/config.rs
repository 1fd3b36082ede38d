//! Write guard configuration

use rtdbx_core::{OperationKind, Result};
use serde::{Deserialize, Serialize};

/// Operations snapshotted before they run unless configured otherwise
///
/// `push` is additive: undoing it is a targeted delete, not a restore.
pub const DEFAULT_BACKUP_OPS: [OperationKind; 4] = [
    OperationKind::Put,
    OperationKind::Patch,
    OperationKind::Delete,
    OperationKind::Load,
];

/// Which safety steps the write guard performs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    pub backup_enabled: bool,
    pub backup_ops: Vec<OperationKind>,
    pub ledger_enabled: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            backup_enabled: true,
            backup_ops: DEFAULT_BACKUP_OPS.to_vec(),
            ledger_enabled: true,
        }
    }
}

impl GuardConfig {
    pub fn with_backup_enabled(mut self, enabled: bool) -> Self {
        self.backup_enabled = enabled;
        self
    }

    pub fn with_backup_ops(mut self, ops: impl IntoIterator<Item = OperationKind>) -> Self {
        self.backup_ops = ops.into_iter().collect();
        self
    }

    pub fn with_ledger_enabled(mut self, enabled: bool) -> Self {
        self.ledger_enabled = enabled;
        self
    }

    /// Whether `op` is snapshotted before it runs
    pub fn should_backup(&self, op: OperationKind) -> bool {
        self.backup_enabled && self.backup_ops.contains(&op)
    }
}

/// Parse a comma-separated operation list such as `put,delete`
///
/// Blank input yields an empty list.
///
/// # Errors
///
/// `InvalidInput` if any item is not an operation kind
pub fn parse_backup_ops(list: &str) -> Result<Vec<OperationKind>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse::<OperationKind>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_not_backed_up_by_default() {
        let config = GuardConfig::default();
        assert!(!config.should_backup(OperationKind::Push));
        assert!(config.should_backup(OperationKind::Delete));
        assert!(config.should_backup(OperationKind::Load));
    }

    #[test]
    fn test_disabling_backup_overrides_list() {
        let config = GuardConfig::default().with_backup_enabled(false);
        assert!(!config.should_backup(OperationKind::Put));
    }

    #[test]
    fn test_parse_backup_ops() {
        assert_eq!(
            parse_backup_ops(" delete, push ").unwrap(),
            vec![OperationKind::Delete, OperationKind::Push]
        );
        assert!(parse_backup_ops("").unwrap().is_empty());
        assert!(parse_backup_ops("delete,drop").is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GuardConfig = serde_json::from_str(r#"{"ledgerEnabled": false}"#).unwrap();
        assert!(!config.ledger_enabled);
        assert!(config.backup_enabled);
        assert_eq!(config.backup_ops, DEFAULT_BACKUP_OPS.to_vec());
    }
}
