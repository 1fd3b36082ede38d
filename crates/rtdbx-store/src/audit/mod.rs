//! Append-only audit ledger of write attempts

mod entry;
mod ledger;

pub use entry::{AuditEntry, AuditStatus};
pub use ledger::{AuditFilter, AuditLedger, LEDGER_FILE_NAME};
