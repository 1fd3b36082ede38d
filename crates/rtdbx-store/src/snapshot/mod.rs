//! Snapshot subsystem
//!
//! - `codec`: subtree ⇄ YAML document, including the chunked restore
//! - `filename`: the self-describing filename grammar
//! - `store`: named snapshots on disk (backup, list, restore)

pub mod codec;
pub mod filename;
pub mod store;

pub use codec::{
    read_document, ProgressFn, RestoreProgress, SnapshotCodec, SnapshotData, SnapshotDocument,
    PATH_KEY, VALUE_KEY,
};
pub use filename::{SnapshotMeta, SnapshotNaming};
pub use store::{SnapshotFilter, SnapshotStore};
