//! Subcommand implementations

pub mod audit;
pub mod backup;
pub mod context;
pub mod read;
pub mod write;

use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Print a command result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a command-line value as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
