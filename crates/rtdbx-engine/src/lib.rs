//! rtdbx Engine - write-safety orchestration
//!
//! Coordinates the store layer around every mutating call:
//! - `guard`: snapshot, write, ledger entry for one invocation
//! - `commands`: write and read command dispatch over an `RtdbClient`
//! - `config`: which operations are snapshotted and audited

pub mod commands;
pub mod config;
pub mod guard;

pub use commands::{
    apply_read_command, apply_write_command, shallow_summary, ReadCommand, WriteCommand,
    WriteOutcome,
};
pub use config::GuardConfig;
pub use guard::{GuardOutcome, WriteGuard};
