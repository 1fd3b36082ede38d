//! rtdbx Core - shared vocabulary of the write-safety layer
//!
//! This crate provides the pieces every other rtdbx crate builds on:
//! - The canonical error facility (`RxError`, `RxErrorKind`)
//! - The structured logging facility and its test capture mode
//! - `OperationKind` and RTDB path helpers
//! - The `RtdbClient` collaborator contract
//! - `MemoryDb`, an in-process implementation of that contract

pub mod client;
pub mod errors;
pub mod logging_facility;
pub mod memory;
pub mod model;
pub mod push_id;

pub use rtdbx_core_types::schema;

// Re-export commonly used types
pub use client::{OrderBy, QueryOptions, RtdbClient};
pub use errors::{Result, RxError, RxErrorKind};
pub use memory::MemoryDb;
pub use model::{OperationKind, ValueType};
pub use rtdbx_core_types::CorrelationId;
