//! rtdbx Store - local persistence for the write-safety layer
//!
//! Provides:
//! - Snapshot documents and the chunked restore (`snapshot::codec`)
//! - The self-describing snapshot filename grammar (`snapshot::filename`)
//! - The snapshot store / backup manager (`snapshot::store`)
//! - The append-only audit ledger (`audit`)
//! - The large-result file cache (`cache`)
//! - Directory layout configuration (`config`)

pub mod audit;
pub mod cache;
pub mod config;
pub mod errors;
pub mod fs;
pub mod snapshot;

// Re-export key types
pub use audit::{AuditEntry, AuditFilter, AuditLedger, AuditStatus};
pub use cache::{CachedResult, ReadResult, ResultCache};
pub use config::StoreConfig;
pub use errors::Result;
pub use snapshot::{SnapshotCodec, SnapshotFilter, SnapshotMeta, SnapshotNaming, SnapshotStore};
