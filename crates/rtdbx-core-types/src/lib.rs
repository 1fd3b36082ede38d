//! Core types shared across rtdbx facilities
//!
//! This crate provides foundational types used by the error, logging and
//! write-safety layers:
//!
//! - **Correlation types**: CorrelationId shared by ledger entries and snapshots
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::CorrelationId;
pub use sensitive::Sensitive;
