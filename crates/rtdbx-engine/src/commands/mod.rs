//! Command dispatch
//!
//! Every write goes through [`WriteGuard::run`](crate::guard::WriteGuard::run);
//! reads bypass the guard and may be summarized by the result cache.

pub mod engine_command;
pub mod engine_query;

pub use engine_command::{apply_write_command, WriteCommand, WriteOutcome};
pub use engine_query::{apply_read_command, shallow_summary, ReadCommand};
